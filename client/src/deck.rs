//! Handle for a single remote deck.

use std::fmt;

use crate::card::Card;
use crate::client::MochiClient;
use crate::error::MochiError;
use crate::types::{CardFaces, DeckRecord};

/// One deck on the Mochi account.
///
/// A `Deck` is a snapshot of the remote record plus a borrowed handle to the
/// [`MochiClient`] that produced it. Two `Deck` values for the same remote
/// deck do not see each other's changes.
#[derive(Clone)]
pub struct Deck<'a> {
    client: &'a MochiClient,
    record: DeckRecord,
}

impl fmt::Debug for Deck<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deck")
            .field("id", &self.record.id)
            .field("name", &self.record.name)
            .field("parent_id", &self.record.parent_id)
            .finish()
    }
}

impl<'a> Deck<'a> {
    pub(crate) const fn new(client: &'a MochiClient, record: DeckRecord) -> Self {
        Self { client, record }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.record.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.record.name
    }

    /// Parent deck id, `None` for a top-level deck.
    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        self.record.parent_id.as_deref()
    }

    #[must_use]
    pub const fn record(&self) -> &DeckRecord {
        &self.record
    }

    #[must_use]
    pub fn into_record(self) -> DeckRecord {
        self.record
    }

    /// Rename this deck remotely, then update the local name.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::InvalidArgument` for an empty name and
    /// `MochiError::Api` if the API call fails. The local name is unchanged
    /// on error.
    pub async fn update_deck(&mut self, new_name: &str) -> Result<(), MochiError> {
        let updated = self.client.rename_deck(&self.record.id, new_name).await?;
        self.record.name = updated.name;
        Ok(())
    }

    /// Direct children of this deck, from the client's snapshot.
    #[must_use]
    pub fn get_children(&self) -> Vec<Deck<'a>> {
        self.client
            .children_of(&self.record.id)
            .into_iter()
            .map(|record| Deck::new(self.client, record))
            .collect()
    }

    /// Names of the direct children of this deck.
    #[must_use]
    pub fn child_names(&self) -> Vec<String> {
        self.client
            .children_of(&self.record.id)
            .into_iter()
            .map(|record| record.name)
            .collect()
    }

    /// Delete this deck remotely.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::Api` if the API call fails.
    pub async fn delete(self) -> Result<(), MochiError> {
        self.client.delete_deck(&self.record.id).await
    }

    /// Add a card to this deck.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::Api` if the API call fails.
    pub async fn add_card(&self, front: &str, back: &str) -> Result<Card<'a>, MochiError> {
        self.client.create_card(&self.record.id, front, back).await
    }

    /// All cards in this deck.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::Api` if the API call fails.
    pub async fn get_cards(&self) -> Result<Vec<Card<'a>>, MochiError> {
        self.client.cards_in(&self.record.id).await
    }

    /// Front and back of every card in this deck.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::Api` if the API call fails.
    pub async fn card_faces(&self) -> Result<Vec<CardFaces>, MochiError> {
        Ok(self
            .get_cards()
            .await?
            .iter()
            .map(|card| card.faces().clone())
            .collect())
    }

    /// Replace the front and back of a card by id.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::Api` if the API call fails.
    pub async fn update_card(
        &self,
        card_id: &str,
        front: &str,
        back: &str,
    ) -> Result<Card<'a>, MochiError> {
        self.client.update_card(card_id, front, back).await
    }

    /// Delete a card by id.
    ///
    /// Card ids are global, so the card need not belong to this deck.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::Api` if the API call fails.
    pub async fn delete_card(&self, card_id: &str) -> Result<(), MochiError> {
        self.client.delete_card(card_id).await
    }
}
