//! Wire types for Mochi API requests and responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Separator Mochi uses between the front and back of a card's Markdown.
pub const CARD_SEPARATOR: &str = "\n---\n";

/// A deck as returned by the Mochi API.
///
/// Mochi has sent ids as `id` or `_id` and parents as `parent-id`,
/// `parent_id` or `parent`. The first non-empty key wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawDeck")]
pub struct DeckRecord {
    pub id: String,
    pub name: String,
    /// Parent deck id; absent for top-level decks.
    #[serde(rename = "parent-id", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Deck entry as it appears on the wire, every spelling kept apart.
#[derive(Deserialize)]
struct RawDeck {
    #[serde(default)]
    id: Option<Value>,
    #[serde(rename = "_id", default)]
    underscore_id: Option<Value>,
    name: String,
    #[serde(rename = "parent-id", default)]
    parent_dash: Option<Value>,
    #[serde(rename = "parent_id", default)]
    parent_snake: Option<Value>,
    #[serde(default)]
    parent: Option<Value>,
}

impl TryFrom<RawDeck> for DeckRecord {
    type Error = String;

    fn try_from(raw: RawDeck) -> Result<Self, Self::Error> {
        let id = [raw.id, raw.underscore_id]
            .into_iter()
            .flatten()
            .find(is_present)
            .and_then(|v| v.as_str().map(String::from))
            .ok_or_else(|| format!("deck '{}' has no string id", raw.name))?;

        // A non-string parent is treated as top-level.
        let parent_id = [raw.parent_dash, raw.parent_snake, raw.parent]
            .into_iter()
            .flatten()
            .find(is_present)
            .and_then(|v| v.as_str().map(String::from));

        Ok(Self {
            id,
            name: raw.name,
            parent_id,
        })
    }
}

/// Whether a field carries a usable value (not null, empty, zero or false).
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// A card as returned by the Mochi API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardRecord {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(rename = "deck-id", alias = "deck_id")]
    pub deck_id: String,
    /// Markdown content, front and back joined by [`CARD_SEPARATOR`].
    #[serde(default)]
    pub content: String,
}

/// Body for `POST decks/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewDeck {
    pub name: String,
    #[serde(rename = "parent-id", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Body for `POST decks/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct DeckUpdate {
    pub name: String,
}

/// Body for `POST cards/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewCard {
    pub content: String,
    #[serde(rename = "deck-id")]
    pub deck_id: String,
}

/// Body for `POST cards/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct CardUpdate {
    pub content: String,
}

/// One page of a listing endpoint.
///
/// Mochi wraps listings as `{"docs": [...], "bookmark": "..."}`; a bare
/// array is accepted too, and `{}` means nothing to list. Entries stay as
/// raw JSON so a single bad entry can be skipped without failing the whole
/// page.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing {
    Page {
        docs: Vec<serde_json::Value>,
        #[serde(default)]
        bookmark: Option<String>,
    },
    Bare(Vec<serde_json::Value>),
    Empty(EmptyObject),
}

/// Matches only `{}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmptyObject {}

impl Listing {
    #[must_use]
    pub fn into_parts(self) -> (Vec<serde_json::Value>, Option<String>) {
        match self {
            Self::Page { docs, bookmark } => (docs, bookmark),
            Self::Bare(docs) => (docs, None),
            Self::Empty(_) => (Vec::new(), None),
        }
    }
}

/// `{name, id}` pair returned by [`MochiClient::get_decks`](crate::MochiClient::get_decks).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeckSummary {
    pub name: String,
    pub id: String,
}

/// Front and back of a card, without ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardFaces {
    pub front: String,
    pub back: String,
}

/// Join front and back into Mochi's Markdown card format.
#[must_use]
pub fn join_content(front: &str, back: &str) -> String {
    format!("{front}{CARD_SEPARATOR}{back}")
}

/// Split card Markdown on the first separator, trimming both sides.
///
/// Content with no separator is all front.
#[must_use]
pub fn split_content(content: &str) -> CardFaces {
    match content.split_once(CARD_SEPARATOR) {
        Some((front, back)) => CardFaces {
            front: front.trim().to_string(),
            back: back.trim().to_string(),
        },
        None => CardFaces {
            front: content.trim().to_string(),
            back: String::new(),
        },
    }
}
