//! Handle for a single remote card.

use std::fmt;

use crate::client::MochiClient;
use crate::error::MochiError;
use crate::types::{split_content, CardFaces, CardRecord};

/// One flashcard, with its content split into front and back.
#[derive(Clone)]
pub struct Card<'a> {
    client: &'a MochiClient,
    record: CardRecord,
    faces: CardFaces,
}

impl fmt::Debug for Card<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Card")
            .field("id", &self.record.id)
            .field("deck_id", &self.record.deck_id)
            .field("front", &self.faces.front)
            .field("back", &self.faces.back)
            .finish()
    }
}

impl<'a> Card<'a> {
    pub(crate) fn new(client: &'a MochiClient, record: CardRecord) -> Self {
        let faces = split_content(&record.content);
        Self {
            client,
            record,
            faces,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.record.id
    }

    #[must_use]
    pub fn deck_id(&self) -> &str {
        &self.record.deck_id
    }

    #[must_use]
    pub fn front(&self) -> &str {
        &self.faces.front
    }

    #[must_use]
    pub fn back(&self) -> &str {
        &self.faces.back
    }

    #[must_use]
    pub const fn faces(&self) -> &CardFaces {
        &self.faces
    }

    /// Raw Markdown content as stored by Mochi.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.record.content
    }

    #[must_use]
    pub const fn record(&self) -> &CardRecord {
        &self.record
    }

    /// Update the front and/or back; a side passed as `None` keeps its
    /// current value. With both `None` nothing is sent.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::Api` if the API call fails; the card is
    /// unchanged on error.
    pub async fn update(
        &mut self,
        front: Option<&str>,
        back: Option<&str>,
    ) -> Result<(), MochiError> {
        if front.is_none() && back.is_none() {
            return Ok(());
        }

        let front = front.unwrap_or(&self.faces.front);
        let back = back.unwrap_or(&self.faces.back);
        let updated = self
            .client
            .update_card(&self.record.id, front, back)
            .await?;

        *self = updated;
        Ok(())
    }

    /// Delete this card remotely.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::Api` if the API call fails.
    pub async fn delete(self) -> Result<(), MochiError> {
        self.client.delete_card(&self.record.id).await
    }
}
