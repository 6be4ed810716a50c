//! Error types for Mochi client operations.
//!
//! Local problems (bad arguments, failed snapshot lookups) are reported
//! before any request is sent. Everything that goes wrong on the remote side
//! funnels into [`ApiError`], which records the operation, HTTP status (when
//! one was received), and a readable message.

use std::fmt;

use thiserror::Error;

/// Maximum number of characters of a response body kept on an error.
pub const BODY_SNIPPET_LIMIT: usize = 500;

/// The remote operation that produced an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Connect,
    ListDecks,
    CreateDeck,
    UpdateDeck,
    DeleteDeck,
    ListCards,
    GetCard,
    CreateCard,
    UpdateCard,
    DeleteCard,
}

impl Operation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::ListDecks => "list decks",
            Self::CreateDeck => "create deck",
            Self::UpdateDeck => "update deck",
            Self::DeleteDeck => "delete deck",
            Self::ListCards => "list cards",
            Self::GetCard => "get card",
            Self::CreateCard => "create card",
            Self::UpdateCard => "update card",
            Self::DeleteCard => "delete card",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What went wrong on the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The server answered with a non-success status.
    Status,
    /// The request did not complete before the client timeout.
    Timeout,
    /// Connection, TLS, or other transport failure.
    Transport,
    /// The server answered successfully but the body was not what we expected.
    Malformed,
}

/// A failed call to the Mochi API.
#[derive(Debug, Error)]
#[error("{operation} failed: {message}{}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
pub struct ApiError {
    pub operation: Operation,
    pub kind: ApiErrorKind,
    /// HTTP status, absent when no response was received.
    pub status: Option<u16>,
    pub message: String,
    /// Leading part of the response body, if any.
    pub body: Option<String>,
    #[source]
    source: Option<reqwest::Error>,
}

impl ApiError {
    /// Error for a non-success HTTP status.
    #[must_use]
    pub fn status(operation: Operation, status: u16, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind: ApiErrorKind::Status,
            status: Some(status),
            message: message.into(),
            body: None,
            source: None,
        }
    }

    /// Error for a response body that could not be interpreted.
    #[must_use]
    pub fn malformed(operation: Operation, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind: ApiErrorKind::Malformed,
            status: None,
            message: message.into(),
            body: None,
            source: None,
        }
    }

    /// Error for a request that never produced a usable response.
    #[must_use]
    pub fn transport(operation: Operation, source: reqwest::Error) -> Self {
        let kind = if source.is_timeout() {
            ApiErrorKind::Timeout
        } else {
            ApiErrorKind::Transport
        };
        Self {
            operation,
            kind,
            status: source.status().map(|s| s.as_u16()),
            message: source.to_string(),
            body: None,
            source: Some(source),
        }
    }

    /// Attach a (truncated) copy of the response body.
    #[must_use]
    pub fn with_body(mut self, body: &str) -> Self {
        if !body.is_empty() {
            self.body = Some(snippet(body));
        }
        self
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

/// Errors returned by [`MochiClient`](crate::MochiClient) and its handles.
#[derive(Debug, Error)]
pub enum MochiError {
    /// A required argument was empty or otherwise unusable. No request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A lookup in the local deck snapshot found nothing.
    #[error("{resource} not found: '{key}'")]
    NotFound { resource: &'static str, key: String },

    /// Several decks share the requested name.
    #[error("multiple decks named '{name}' (ids: {})", .ids.join(", "))]
    AmbiguousName { name: String, ids: Vec<String> },

    /// The remote API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl MochiError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// HTTP status of the failed call, if the error came from a response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api(err) => err.status,
            _ => None,
        }
    }
}

/// Pull a readable message out of an error body.
///
/// Mochi reports failures as JSON with either an `errors` or a `message`
/// field; anything else is returned as trimmed text.
pub(crate) fn extract_error_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => match map.get("errors").or_else(|| map.get("message")) {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => Some(snippet(trimmed)),
        },
        _ => Some(snippet(trimmed)),
    }
}

fn snippet(text: &str) -> String {
    match text.char_indices().nth(BODY_SNIPPET_LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
