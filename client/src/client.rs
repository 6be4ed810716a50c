//! The authenticated session object.

use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::api::{HttpMochiApi, MochiApi};
use crate::card::Card;
use crate::config::ApiConfig;
use crate::deck::Deck;
use crate::error::MochiError;
use crate::snapshot::DeckSnapshot;
use crate::types::{
    join_content, CardUpdate, DeckRecord, DeckSummary, DeckUpdate, NewCard, NewDeck,
};

/// A connected Mochi session.
///
/// Holds the transport and a [`DeckSnapshot`] taken at connect time. Deck
/// lookups (`get_deck`, `get_decks`, `Deck::get_children`) read the
/// snapshot; deck mutations made through this client re-fetch it. Call
/// [`refresh_decks`](Self::refresh_decks) to pick up changes made elsewhere.
pub struct MochiClient {
    api: Box<dyn MochiApi>,
    snapshot: RwLock<DeckSnapshot>,
}

impl fmt::Debug for MochiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MochiClient")
            .field("decks", &self.read().len())
            .finish_non_exhaustive()
    }
}

impl MochiClient {
    /// Connect to the Mochi API with default settings and load the deck list.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::InvalidArgument` for an empty key (no request is
    /// sent) and `MochiError::Api` if the key is rejected or the deck list
    /// cannot be loaded.
    pub async fn connect(api_key: &str) -> Result<Self, MochiError> {
        Self::connect_with_config(&ApiConfig::default(), api_key).await
    }

    /// Like [`connect`](Self::connect), with a custom base URL and timeout.
    ///
    /// # Errors
    ///
    /// See [`connect`](Self::connect).
    pub async fn connect_with_config(config: &ApiConfig, api_key: &str) -> Result<Self, MochiError> {
        if api_key.trim().is_empty() {
            return Err(MochiError::invalid(
                "Mochi API key must be a non-empty string",
            ));
        }

        let api = HttpMochiApi::from_config(config, api_key)?;
        Self::with_api(api).await
    }

    /// Build a client over any [`MochiApi`] implementation and load the deck list.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::Api` if the deck list cannot be loaded.
    pub async fn with_api(api: impl MochiApi + 'static) -> Result<Self, MochiError> {
        let decks = api.list_decks().await?;
        tracing::info!(decks = decks.len(), "connected to Mochi");

        Ok(Self {
            api: Box::new(api),
            snapshot: RwLock::new(DeckSnapshot::new(decks)),
        })
    }

    /// The underlying transport.
    #[must_use]
    pub fn api(&self) -> &dyn MochiApi {
        self.api.as_ref()
    }

    fn read(&self) -> RwLockReadGuard<'_, DeckSnapshot> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DeckSnapshot> {
        self.snapshot.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the current deck snapshot.
    #[must_use]
    pub fn snapshot(&self) -> DeckSnapshot {
        self.read().clone()
    }

    /// Number of decks in the snapshot, duplicates included.
    #[must_use]
    pub fn count_decks(&self) -> usize {
        self.read().len()
    }

    /// Unique deck names from the snapshot.
    #[must_use]
    pub fn deck_names(&self) -> Vec<String> {
        self.read().names()
    }

    /// `{name, id}` for every deck in the snapshot.
    #[must_use]
    pub fn get_decks(&self) -> Vec<DeckSummary> {
        self.read().summaries()
    }

    /// Look up a deck by exact name in the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::NotFound` if no deck has the name and
    /// `MochiError::AmbiguousName` if several do.
    pub fn get_deck(&self, name: &str) -> Result<Deck<'_>, MochiError> {
        let record = self.read().find_by_name(name)?.clone();
        Ok(Deck::new(self, record))
    }

    /// Look up a deck by id in the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::NotFound` if no deck has the id.
    pub fn get_deck_by_id(&self, id: &str) -> Result<Deck<'_>, MochiError> {
        let record = self
            .read()
            .find_by_id(id)
            .cloned()
            .ok_or_else(|| MochiError::NotFound {
                resource: "deck",
                key: id.to_string(),
            })?;
        Ok(Deck::new(self, record))
    }

    pub(crate) fn children_of(&self, parent_id: &str) -> Vec<DeckRecord> {
        self.read().children_of(parent_id).cloned().collect()
    }

    /// Re-fetch the deck list, replacing the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::Api` if the deck list cannot be loaded; the old
    /// snapshot is kept in that case.
    pub async fn refresh_decks(&self) -> Result<(), MochiError> {
        let decks = self.api.list_decks().await?;
        tracing::debug!(decks = decks.len(), "refreshed deck snapshot");
        *self.write() = DeckSnapshot::new(decks);
        Ok(())
    }

    /// Apply a completed mutation to the snapshot, then re-fetch it.
    ///
    /// The mutation already succeeded remotely, so a failed re-fetch only
    /// leaves the locally patched snapshot in place.
    async fn sync_snapshot(&self, patch: impl FnOnce(&mut DeckSnapshot) + Send) {
        {
            let mut snapshot = self.write();
            patch(&mut snapshot);
        }

        if let Err(e) = self.refresh_decks().await {
            tracing::warn!(error = %e, "deck snapshot refresh failed; keeping local copy");
        }
    }

    /// Create a deck, optionally nested under `parent_id`.
    ///
    /// An empty `parent_id` creates a top-level deck.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::InvalidArgument` for an empty name and
    /// `MochiError::Api` if the API call fails.
    pub async fn create_deck(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<Deck<'_>, MochiError> {
        if name.trim().is_empty() {
            return Err(MochiError::invalid("deck name must not be empty"));
        }

        let parent_id = parent_id.filter(|p| !p.is_empty()).map(String::from);
        let request = NewDeck {
            name: name.to_string(),
            parent_id: parent_id.clone(),
        };

        let mut record = self.api.create_deck(&request).await?;
        if record.parent_id.is_none() {
            record.parent_id = parent_id;
        }
        tracing::info!(deck_id = %record.id, name = %record.name, "created deck");

        let inserted = record.clone();
        self.sync_snapshot(move |snapshot| snapshot.insert(inserted))
            .await;

        Ok(Deck::new(self, record))
    }

    /// Rename a deck remotely and return the updated record.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::InvalidArgument` for an empty id or name and
    /// `MochiError::Api` if the API call fails.
    pub async fn rename_deck(&self, id: &str, new_name: &str) -> Result<DeckRecord, MochiError> {
        if id.is_empty() {
            return Err(MochiError::invalid("deck id must not be empty"));
        }
        if new_name.trim().is_empty() {
            return Err(MochiError::invalid("deck name must not be empty"));
        }

        let update = DeckUpdate {
            name: new_name.to_string(),
        };
        let record = self.api.update_deck(id, &update).await?;
        tracing::info!(deck_id = %id, name = %record.name, "renamed deck");

        let (renamed_id, renamed_to) = (id.to_string(), record.name.clone());
        self.sync_snapshot(move |snapshot| snapshot.rename(&renamed_id, &renamed_to))
            .await;

        Ok(record)
    }

    /// Delete a deck by id.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::InvalidArgument` for an empty id and
    /// `MochiError::Api` if the API call fails (status 404 when the deck
    /// does not exist).
    pub async fn delete_deck(&self, id: &str) -> Result<(), MochiError> {
        if id.is_empty() {
            return Err(MochiError::invalid("deck id must not be empty"));
        }

        self.api.delete_deck(id).await?;
        tracing::info!(deck_id = %id, "deleted deck");

        let removed = id.to_string();
        self.sync_snapshot(move |snapshot| snapshot.remove(&removed))
            .await;
        Ok(())
    }

    /// Create a card in the deck with id `deck_id`.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::InvalidArgument` for an empty deck id and
    /// `MochiError::Api` if the API call fails.
    pub async fn create_card(
        &self,
        deck_id: &str,
        front: &str,
        back: &str,
    ) -> Result<Card<'_>, MochiError> {
        if deck_id.is_empty() {
            return Err(MochiError::invalid("deck id must not be empty"));
        }

        let request = NewCard {
            content: join_content(front, back),
            deck_id: deck_id.to_string(),
        };
        let record = self.api.create_card(&request).await?;
        tracing::info!(card_id = %record.id, deck_id = %deck_id, "created card");
        Ok(Card::new(self, record))
    }

    /// List the cards of a deck given by name or id.
    ///
    /// The name or id is resolved against the snapshot, name first.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::NotFound` / `MochiError::AmbiguousName` if the
    /// deck cannot be resolved and `MochiError::Api` if the API call fails.
    pub async fn get_cards(&self, deck_name_or_id: &str) -> Result<Vec<Card<'_>>, MochiError> {
        let deck_id = self.read().resolve(deck_name_or_id)?.id.clone();
        self.cards_in(&deck_id).await
    }

    pub(crate) async fn cards_in(&self, deck_id: &str) -> Result<Vec<Card<'_>>, MochiError> {
        let records = self.api.list_cards(deck_id).await?;
        tracing::debug!(deck_id = %deck_id, cards = records.len(), "listed cards");
        Ok(records
            .into_iter()
            .map(|record| Card::new(self, record))
            .collect())
    }

    /// Fetch a single card by id.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::InvalidArgument` for an empty id and
    /// `MochiError::Api` if the API call fails.
    pub async fn get_card(&self, card_id: &str) -> Result<Card<'_>, MochiError> {
        if card_id.is_empty() {
            return Err(MochiError::invalid("card id must not be empty"));
        }
        let record = self.api.get_card(card_id).await?;
        Ok(Card::new(self, record))
    }

    /// Replace the front and back of a card.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::InvalidArgument` for an empty id and
    /// `MochiError::Api` if the API call fails.
    pub async fn update_card(
        &self,
        card_id: &str,
        front: &str,
        back: &str,
    ) -> Result<Card<'_>, MochiError> {
        if card_id.is_empty() {
            return Err(MochiError::invalid("card id must not be empty"));
        }

        let update = CardUpdate {
            content: join_content(front, back),
        };
        let record = self.api.update_card(card_id, &update).await?;
        tracing::info!(card_id = %card_id, "updated card");
        Ok(Card::new(self, record))
    }

    /// Delete a card by id.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::InvalidArgument` for an empty id and
    /// `MochiError::Api` if the API call fails.
    pub async fn delete_card(&self, card_id: &str) -> Result<(), MochiError> {
        if card_id.is_empty() {
            return Err(MochiError::invalid("card id must not be empty"));
        }

        self.api.delete_card(card_id).await?;
        tracing::info!(card_id = %card_id, "deleted card");
        Ok(())
    }
}
