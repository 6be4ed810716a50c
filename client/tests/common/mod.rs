//! Common test utilities for integration tests.
//!
//! This module provides:
//!
//! - [`http_mock::MockHttpServer`] - Stub the Mochi REST API over real HTTP
//! - [`deck_json`] / [`card_json`] - Mochi-shaped JSON fixtures
//!
//! # Usage
//!
//! ```ignore
//! use crate::common::http_mock::MockHttpServer;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let server = MockHttpServer::start().await;
//!     server.stub_decks(vec![deck_json("d1", "Spanish", None)]).await;
//!     let client = server.connect().await;
//! }
//! ```

#![allow(dead_code)]

pub mod http_mock;

use serde_json::{json, Value};

/// API key used by every HTTP test.
pub const TEST_API_KEY: &str = "test-api-key";

/// A deck as the Mochi API returns it.
pub fn deck_json(id: &str, name: &str, parent: Option<&str>) -> Value {
    match parent {
        Some(parent) => json!({"id": id, "name": name, "parent-id": parent, "sort": 0}),
        None => json!({"id": id, "name": name, "sort": 0}),
    }
}

/// A card as the Mochi API returns it.
pub fn card_json(id: &str, deck_id: &str, content: &str) -> Value {
    json!({
        "id": id,
        "deck-id": deck_id,
        "content": content,
        "name": null,
        "archived?": false
    })
}

/// Wrap entries in Mochi's listing envelope.
pub fn listing(docs: Vec<Value>) -> Value {
    json!({"docs": docs})
}
