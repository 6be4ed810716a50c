//! Point-in-time copy of the account's deck list.
//!
//! The snapshot is taken when the client connects and replaced only by an
//! explicit refresh or by deck mutations made through the same client.
//! Changes made elsewhere (another client, the Mochi app) are not seen until
//! the next refresh.

use chrono::{DateTime, Utc};

use crate::error::MochiError;
use crate::types::{DeckRecord, DeckSummary};

#[derive(Debug, Clone)]
pub struct DeckSnapshot {
    decks: Vec<DeckRecord>,
    taken_at: DateTime<Utc>,
}

impl DeckSnapshot {
    #[must_use]
    pub fn new(decks: Vec<DeckRecord>) -> Self {
        Self {
            decks,
            taken_at: Utc::now(),
        }
    }

    /// When the deck list was fetched.
    #[must_use]
    pub const fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    #[must_use]
    pub fn decks(&self) -> &[DeckRecord] {
        &self.decks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.decks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decks.is_empty()
    }

    /// Unique deck names, in the order they were first seen.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for deck in &self.decks {
            if !names.contains(&deck.name) {
                names.push(deck.name.clone());
            }
        }
        names
    }

    /// One `{name, id}` entry per deck, duplicates included.
    #[must_use]
    pub fn summaries(&self) -> Vec<DeckSummary> {
        self.decks
            .iter()
            .map(|d| DeckSummary {
                name: d.name.clone(),
                id: d.id.clone(),
            })
            .collect()
    }

    /// Find the single deck with exactly this name.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::NotFound` if no deck has the name, or
    /// `MochiError::AmbiguousName` if more than one does.
    pub fn find_by_name(&self, name: &str) -> Result<&DeckRecord, MochiError> {
        let matches: Vec<&DeckRecord> = self.decks.iter().filter(|d| d.name == name).collect();
        match matches.as_slice() {
            [] => Err(MochiError::NotFound {
                resource: "deck",
                key: name.to_string(),
            }),
            [deck] => Ok(deck),
            many => Err(MochiError::AmbiguousName {
                name: name.to_string(),
                ids: many.iter().map(|d| d.id.clone()).collect(),
            }),
        }
    }

    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&DeckRecord> {
        self.decks.iter().find(|d| d.id == id)
    }

    /// Resolve a deck by name first, falling back to id.
    ///
    /// An ambiguous name is an error even if the input also matches an id.
    ///
    /// # Errors
    ///
    /// Returns `MochiError::AmbiguousName` for a shared name and
    /// `MochiError::NotFound` if neither a name nor an id matches.
    pub fn resolve(&self, name_or_id: &str) -> Result<&DeckRecord, MochiError> {
        match self.find_by_name(name_or_id) {
            Ok(deck) => Ok(deck),
            Err(MochiError::NotFound { .. }) => {
                self.find_by_id(name_or_id)
                    .ok_or_else(|| MochiError::NotFound {
                        resource: "deck",
                        key: name_or_id.to_string(),
                    })
            }
            Err(err) => Err(err),
        }
    }

    /// Decks whose parent is `parent_id`.
    pub fn children_of<'s>(&'s self, parent_id: &'s str) -> impl Iterator<Item = &'s DeckRecord> {
        self.decks
            .iter()
            .filter(move |d| d.parent_id.as_deref() == Some(parent_id))
    }

    pub(crate) fn insert(&mut self, deck: DeckRecord) {
        self.remove(&deck.id);
        self.decks.push(deck);
    }

    pub(crate) fn rename(&mut self, id: &str, name: &str) {
        if let Some(deck) = self.decks.iter_mut().find(|d| d.id == id) {
            deck.name = name.to_string();
        }
    }

    pub(crate) fn remove(&mut self, id: &str) {
        self.decks.retain(|d| d.id != id);
    }
}

impl Default for DeckSnapshot {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
