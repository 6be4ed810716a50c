//! End-to-end tests for `MochiClient` over stubbed HTTP.

mod common;

use common::http_mock::{basic_auth, MockHttpServer};
use common::{card_json, deck_json, listing, TEST_API_KEY};
use mochi_client::{ApiConfig, MochiClient, MochiError};
use serde_json::json;

#[tokio::test]
async fn test_connect_loads_deck_snapshot() {
    let server = MockHttpServer::start().await;
    server
        .stub_decks(vec![
            deck_json("d1", "Languages", None),
            deck_json("d2", "Spanish", Some("d1")),
        ])
        .await;

    let client = server.connect().await;

    assert_eq!(client.count_decks(), 2);
    assert_eq!(client.deck_names(), vec!["Languages", "Spanish"]);
    assert_eq!(server.count("GET", "/decks/").await, 1);
}

#[tokio::test]
async fn test_connect_with_empty_key_sends_nothing() {
    let server = MockHttpServer::start().await;
    let config = ApiConfig {
        base_url: server.url(),
        timeout_secs: 5,
    };

    let result = MochiClient::connect_with_config(&config, "").await;

    assert!(matches!(result, Err(MochiError::InvalidArgument(_))));
    assert!(server.received().await.is_empty());
}

#[tokio::test]
async fn test_connect_with_rejected_key() {
    let server = MockHttpServer::start().await;
    server
        .expect_get("/decks/")
        .respond_with_status(401)
        .with_json_response(json!({"message": "Unauthorized"}))
        .mount()
        .await;

    let config = ApiConfig {
        base_url: server.url(),
        timeout_secs: 5,
    };
    let err = MochiClient::connect_with_config(&config, "bad-key")
        .await
        .expect_err("should fail");

    assert_eq!(err.status(), Some(401));
    assert!(matches!(err, MochiError::Api(_)));
}

#[tokio::test]
async fn test_get_deck_exact_name() {
    let server = MockHttpServer::start().await;
    server
        .stub_decks(vec![
            deck_json("d1", "Spanish", None),
            deck_json("d2", "Spanish Verbs", None),
        ])
        .await;
    let client = server.connect().await;

    let deck = client.get_deck("Spanish").expect("should exist");
    assert_eq!(deck.id(), "d1");
    assert_eq!(deck.name(), "Spanish");

    assert!(matches!(
        client.get_deck("Span"),
        Err(MochiError::NotFound { resource: "deck", .. })
    ));
}

#[tokio::test]
async fn test_create_deck_refreshes_snapshot() {
    let server = MockHttpServer::start().await;

    // Connect sees only the parent.
    server.stub_decks(vec![deck_json("d1", "Languages", None)]).await;
    let client = server.connect().await;

    // The re-fetch after create sees both.
    server.inner().reset().await;
    server
        .expect_post("/decks/")
        .with_header("authorization", &basic_auth(TEST_API_KEY))
        .with_json_body(json!({"name": "French", "parent-id": "d1"}))
        .respond_with_json(deck_json("d2", "French", Some("d1")))
        .expect_times(1)
        .mount()
        .await;
    server
        .stub_decks(vec![
            deck_json("d1", "Languages", None),
            deck_json("d2", "French", Some("d1")),
        ])
        .await;

    let deck = client
        .create_deck("French", Some("d1"))
        .await
        .expect("should succeed");

    assert_eq!(deck.name(), "French");
    assert_eq!(deck.parent_id(), Some("d1"));
    assert_eq!(server.count("GET", "/decks/").await, 1);
    assert_eq!(
        client.get_deck("Languages").expect("parent").child_names(),
        vec!["French"]
    );
}

#[tokio::test]
async fn test_delete_missing_deck_reports_404() {
    let server = MockHttpServer::start().await;
    server.stub_decks(vec![deck_json("d1", "Keep", None)]).await;
    server
        .expect_delete("/decks/ghost")
        .respond_with_status(404)
        .mount()
        .await;
    let client = server.connect().await;

    let err = client.delete_deck("ghost").await.expect_err("should fail");

    assert_eq!(err.status(), Some(404));
    assert_eq!(client.count_decks(), 1);
}

#[tokio::test]
async fn test_get_cards_by_name_and_id() {
    let server = MockHttpServer::start().await;
    server.stub_decks(vec![deck_json("d1", "Capitals", None)]).await;
    server
        .expect_get("/cards/")
        .with_query_param("deck-id", "d1")
        .respond_with_json(listing(vec![
            card_json("c1", "d1", "France\n---\nParis"),
            card_json("c2", "d1", "Spain\n---\n Madrid "),
        ]))
        .expect_times(2)
        .mount()
        .await;
    let client = server.connect().await;

    let by_name = client.get_cards("Capitals").await.expect("by name");
    let by_id = client.get_cards("d1").await.expect("by id");

    assert_eq!(by_name.len(), 2);
    assert_eq!(by_id.len(), 2);
    assert_eq!(by_name[1].front(), "Spain");
    assert_eq!(by_name[1].back(), "Madrid");
}

#[tokio::test]
async fn test_card_partial_update_over_http() {
    let server = MockHttpServer::start().await;
    server.stub_decks(vec![deck_json("d1", "Capitals", None)]).await;
    server
        .expect_get("/cards/c1")
        .respond_with_json(card_json("c1", "d1", "France\n---\nLyon"))
        .mount()
        .await;
    server
        .expect_post("/cards/c1")
        .with_json_body(json!({"content": "France\n---\nParis"}))
        .respond_with_json(card_json("c1", "d1", "France\n---\nParis"))
        .expect_times(1)
        .mount()
        .await;
    let client = server.connect().await;

    let mut card = client.get_card("c1").await.expect("get card");
    card.update(None, Some("Paris")).await.expect("update");

    assert_eq!(card.front(), "France");
    assert_eq!(card.back(), "Paris");
}
