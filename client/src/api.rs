//! Raw Mochi REST operations.
//!
//! [`MochiApi`] is the seam between the object layer
//! ([`MochiClient`](crate::MochiClient), [`Deck`](crate::Deck),
//! [`Card`](crate::Card)) and the network:
//!
//! - [`HttpMochiApi`] talks to the real service with reqwest
//! - [`mock::MockMochiApi`] keeps decks and cards in memory (behind `test-utils`)
//!
//! # Example
//!
//! ```ignore
//! use mochi_client::api::{HttpMochiApi, MochiApi};
//!
//! let api = HttpMochiApi::new("https://app.mochi.cards/api", "my-api-key");
//! let decks = api.list_decks().await?;
//! println!("{} decks", decks.len());
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::error::{extract_error_detail, ApiError, MochiError, Operation};
use crate::types::{CardRecord, CardUpdate, DeckRecord, DeckUpdate, Listing, NewCard, NewDeck};

/// Default Mochi API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://app.mochi.cards/api/";

/// Trait for Mochi API operations.
///
/// Updates use `POST` on the resource path, as the Mochi API requires.
#[async_trait]
pub trait MochiApi: Send + Sync {
    /// List every deck on the account, following pagination.
    async fn list_decks(&self) -> Result<Vec<DeckRecord>, ApiError>;

    async fn create_deck(&self, deck: &NewDeck) -> Result<DeckRecord, ApiError>;

    /// Rename a deck.
    async fn update_deck(&self, id: &str, update: &DeckUpdate) -> Result<DeckRecord, ApiError>;

    async fn delete_deck(&self, id: &str) -> Result<(), ApiError>;

    /// List every card in a deck, following pagination.
    async fn list_cards(&self, deck_id: &str) -> Result<Vec<CardRecord>, ApiError>;

    async fn get_card(&self, id: &str) -> Result<CardRecord, ApiError>;

    async fn create_card(&self, card: &NewCard) -> Result<CardRecord, ApiError>;

    /// Replace a card's content.
    async fn update_card(&self, id: &str, update: &CardUpdate) -> Result<CardRecord, ApiError>;

    async fn delete_card(&self, id: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl<T: MochiApi + ?Sized> MochiApi for Arc<T> {
    async fn list_decks(&self) -> Result<Vec<DeckRecord>, ApiError> {
        (**self).list_decks().await
    }

    async fn create_deck(&self, deck: &NewDeck) -> Result<DeckRecord, ApiError> {
        (**self).create_deck(deck).await
    }

    async fn update_deck(&self, id: &str, update: &DeckUpdate) -> Result<DeckRecord, ApiError> {
        (**self).update_deck(id, update).await
    }

    async fn delete_deck(&self, id: &str) -> Result<(), ApiError> {
        (**self).delete_deck(id).await
    }

    async fn list_cards(&self, deck_id: &str) -> Result<Vec<CardRecord>, ApiError> {
        (**self).list_cards(deck_id).await
    }

    async fn get_card(&self, id: &str) -> Result<CardRecord, ApiError> {
        (**self).get_card(id).await
    }

    async fn create_card(&self, card: &NewCard) -> Result<CardRecord, ApiError> {
        (**self).create_card(card).await
    }

    async fn update_card(&self, id: &str, update: &CardUpdate) -> Result<CardRecord, ApiError> {
        (**self).update_card(id, update).await
    }

    async fn delete_card(&self, id: &str) -> Result<(), ApiError> {
        (**self).delete_card(id).await
    }
}

/// HTTP-based implementation of `MochiApi`.
///
/// Authenticates with HTTP Basic auth, the API key as username and an
/// empty password.
pub struct HttpMochiApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for HttpMochiApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMochiApi")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl HttpMochiApi {
    /// Create a new client with the given base URL and API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key)
    }

    /// Create a client with a custom `reqwest::Client` (for testing with custom config).
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Build a client honoring the configured base URL and timeout.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::Api` if the underlying HTTP client cannot be built.
    pub fn from_config(config: &ApiConfig, api_key: impl Into<String>) -> Result<Self, MochiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("mochi-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::transport(Operation::Connect, e))?;
        Ok(Self::with_client(client, &config.base_url, api_key))
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        self.client
            .request(method, url)
            .basic_auth(&self.api_key, Some(""))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Send a request and return the body text of a successful response.
    async fn send(
        &self,
        operation: Operation,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> Result<String, ApiError> {
        tracing::debug!(%operation, %method, path, "sending Mochi API request");

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::transport(operation, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::transport(operation, e))?;

        if !status.is_success() {
            let mut message = format!("{method} {path} returned {}", status.as_u16());
            if let Some(detail) = extract_error_detail(&body) {
                message = format!("{message}: {detail}");
            }
            tracing::debug!(%operation, status = status.as_u16(), "Mochi API request failed");
            return Err(ApiError::status(operation, status.as_u16(), message).with_body(&body));
        }

        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: Operation,
        method: Method,
        path: &str,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<T, ApiError> {
        let mut request = self.request(method.clone(), path);
        if let Some(body) = body {
            request = request.json(body);
        }
        let text = self.send(operation, method.clone(), path, request).await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::malformed(
                operation,
                format!("unexpected response from {method} {path}: {e}"),
            )
            .with_body(&text)
        })
    }

    /// Fetch every page of a listing endpoint.
    async fn list_all<T: DeserializeOwned>(
        &self,
        operation: Operation,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        let mut bookmark: Option<String> = None;

        loop {
            let mut request = self.request(Method::GET, path).query(query);
            if let Some(bm) = &bookmark {
                request = request.query(&[("bookmark", bm.as_str())]);
            }

            let text = self.send(operation, Method::GET, path, request).await?;
            let listing: Listing = serde_json::from_str(&text).map_err(|e| {
                ApiError::malformed(
                    operation,
                    format!("expected a listing with 'docs' from GET {path}: {e}"),
                )
                .with_body(&text)
            })?;

            let (docs, next) = listing.into_parts();
            let fetched = docs.len();
            items.extend(parse_entries(operation, docs));

            match next {
                Some(next) if fetched > 0 && bookmark.as_deref() != Some(next.as_str()) => {
                    bookmark = Some(next);
                }
                _ => break,
            }
        }

        Ok(items)
    }

    async fn delete(&self, operation: Operation, path: &str) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, path);
        self.send(operation, Method::DELETE, path, request).await?;
        Ok(())
    }
}

/// Parse listing entries, skipping (and logging) any that don't fit `T`.
fn parse_entries<T: DeserializeOwned>(
    operation: Operation,
    docs: Vec<serde_json::Value>,
) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| match T::deserialize(&doc) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(%operation, error = %e, entry = %doc, "skipping invalid listing entry");
                None
            }
        })
        .collect()
}

#[async_trait]
impl MochiApi for HttpMochiApi {
    async fn list_decks(&self) -> Result<Vec<DeckRecord>, ApiError> {
        self.list_all(Operation::ListDecks, "decks/", &[]).await
    }

    async fn create_deck(&self, deck: &NewDeck) -> Result<DeckRecord, ApiError> {
        self.send_json(Operation::CreateDeck, Method::POST, "decks/", Some(deck))
            .await
    }

    async fn update_deck(&self, id: &str, update: &DeckUpdate) -> Result<DeckRecord, ApiError> {
        let path = format!("decks/{id}");
        self.send_json(Operation::UpdateDeck, Method::POST, &path, Some(update))
            .await
    }

    async fn delete_deck(&self, id: &str) -> Result<(), ApiError> {
        self.delete(Operation::DeleteDeck, &format!("decks/{id}"))
            .await
    }

    async fn list_cards(&self, deck_id: &str) -> Result<Vec<CardRecord>, ApiError> {
        self.list_all(Operation::ListCards, "cards/", &[("deck-id", deck_id)])
            .await
    }

    async fn get_card(&self, id: &str) -> Result<CardRecord, ApiError> {
        let path = format!("cards/{id}");
        self.send_json(Operation::GetCard, Method::GET, &path, None::<&()>)
            .await
    }

    async fn create_card(&self, card: &NewCard) -> Result<CardRecord, ApiError> {
        self.send_json(Operation::CreateCard, Method::POST, "cards/", Some(card))
            .await
    }

    async fn update_card(&self, id: &str, update: &CardUpdate) -> Result<CardRecord, ApiError> {
        let path = format!("cards/{id}");
        self.send_json(Operation::UpdateCard, Method::POST, &path, Some(update))
            .await
    }

    async fn delete_card(&self, id: &str) -> Result<(), ApiError> {
        self.delete(Operation::DeleteCard, &format!("cards/{id}"))
            .await
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::missing_const_for_fn,
    clippy::must_use_candidate
)]
pub mod mock {
    //! In-memory implementation for unit testing.

    use super::{
        ApiError, CardRecord, CardUpdate, DeckRecord, DeckUpdate, MochiApi, NewCard, NewDeck,
        Operation,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct State {
        decks: Vec<DeckRecord>,
        cards: Vec<CardRecord>,
        next_id: u64,
        calls: Vec<Operation>,
        failures: Vec<(Operation, ApiError)>,
    }

    impl State {
        fn fresh_id(&mut self, prefix: &str) -> String {
            self.next_id += 1;
            format!("{prefix}-{}", self.next_id)
        }

        fn take_failure(&mut self, operation: Operation) -> Option<ApiError> {
            let pos = self.failures.iter().position(|(op, _)| *op == operation)?;
            Some(self.failures.remove(pos).1)
        }
    }

    fn not_found(operation: Operation, resource: &str, id: &str) -> ApiError {
        ApiError::status(operation, 404, format!("no {resource} with id '{id}'"))
    }

    /// Mock implementation of `MochiApi` backed by in-memory vectors.
    ///
    /// Seed data with `with_decks`/`insert_card`, inject failures with
    /// `fail_next`, and inspect traffic with `calls()`.
    #[derive(Default)]
    pub struct MockMochiApi {
        state: Mutex<State>,
    }

    impl MockMochiApi {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_decks(decks: Vec<DeckRecord>) -> Self {
            let mock = Self::new();
            mock.state.lock().unwrap().decks = decks;
            mock
        }

        pub fn insert_deck(&self, deck: DeckRecord) {
            self.state.lock().unwrap().decks.push(deck);
        }

        pub fn insert_card(&self, card: CardRecord) {
            self.state.lock().unwrap().cards.push(card);
        }

        /// Make the next call of `operation` fail with `error`.
        pub fn fail_next(&self, operation: Operation, error: ApiError) {
            self.state.lock().unwrap().failures.push((operation, error));
        }

        /// Operations received so far, in order.
        pub fn calls(&self) -> Vec<Operation> {
            self.state.lock().unwrap().calls.clone()
        }

        pub fn decks(&self) -> Vec<DeckRecord> {
            self.state.lock().unwrap().decks.clone()
        }

        pub fn cards(&self) -> Vec<CardRecord> {
            self.state.lock().unwrap().cards.clone()
        }

        fn begin(&self, operation: Operation) -> Result<std::sync::MutexGuard<'_, State>, ApiError> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(operation);
            match state.take_failure(operation) {
                Some(err) => Err(err),
                None => Ok(state),
            }
        }
    }

    #[async_trait]
    impl MochiApi for MockMochiApi {
        async fn list_decks(&self) -> Result<Vec<DeckRecord>, ApiError> {
            let state = self.begin(Operation::ListDecks)?;
            Ok(state.decks.clone())
        }

        async fn create_deck(&self, deck: &NewDeck) -> Result<DeckRecord, ApiError> {
            let mut state = self.begin(Operation::CreateDeck)?;
            let record = DeckRecord {
                id: state.fresh_id("deck"),
                name: deck.name.clone(),
                parent_id: deck.parent_id.clone(),
            };
            state.decks.push(record.clone());
            Ok(record)
        }

        async fn update_deck(
            &self,
            id: &str,
            update: &DeckUpdate,
        ) -> Result<DeckRecord, ApiError> {
            let mut state = self.begin(Operation::UpdateDeck)?;
            let deck = state
                .decks
                .iter_mut()
                .find(|d| d.id == id)
                .ok_or_else(|| not_found(Operation::UpdateDeck, "deck", id))?;
            deck.name = update.name.clone();
            Ok(deck.clone())
        }

        async fn delete_deck(&self, id: &str) -> Result<(), ApiError> {
            let mut state = self.begin(Operation::DeleteDeck)?;
            let before = state.decks.len();
            state.decks.retain(|d| d.id != id);
            if state.decks.len() == before {
                return Err(not_found(Operation::DeleteDeck, "deck", id));
            }
            state.cards.retain(|c| c.deck_id != id);
            Ok(())
        }

        async fn list_cards(&self, deck_id: &str) -> Result<Vec<CardRecord>, ApiError> {
            let state = self.begin(Operation::ListCards)?;
            Ok(state
                .cards
                .iter()
                .filter(|c| c.deck_id == deck_id)
                .cloned()
                .collect())
        }

        async fn get_card(&self, id: &str) -> Result<CardRecord, ApiError> {
            let state = self.begin(Operation::GetCard)?;
            state
                .cards
                .iter()
                .find(|c| c.id == id)
                .cloned()
                .ok_or_else(|| not_found(Operation::GetCard, "card", id))
        }

        async fn create_card(&self, card: &NewCard) -> Result<CardRecord, ApiError> {
            let mut state = self.begin(Operation::CreateCard)?;
            if !state.decks.iter().any(|d| d.id == card.deck_id) {
                return Err(not_found(Operation::CreateCard, "deck", &card.deck_id));
            }
            let record = CardRecord {
                id: state.fresh_id("card"),
                deck_id: card.deck_id.clone(),
                content: card.content.clone(),
            };
            state.cards.push(record.clone());
            Ok(record)
        }

        async fn update_card(
            &self,
            id: &str,
            update: &CardUpdate,
        ) -> Result<CardRecord, ApiError> {
            let mut state = self.begin(Operation::UpdateCard)?;
            let card = state
                .cards
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| not_found(Operation::UpdateCard, "card", id))?;
            card.content = update.content.clone();
            Ok(card.clone())
        }

        async fn delete_card(&self, id: &str) -> Result<(), ApiError> {
            let mut state = self.begin(Operation::DeleteCard)?;
            let before = state.cards.len();
            state.cards.retain(|c| c.id != id);
            if state.cards.len() == before {
                return Err(not_found(Operation::DeleteCard, "card", id));
            }
            Ok(())
        }
    }
}
