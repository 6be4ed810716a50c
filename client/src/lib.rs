#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::print_stdout,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]
//! Client library for the [Mochi](https://mochi.cards) flashcard REST API.
//!
//! ```ignore
//! use mochi_client::MochiClient;
//!
//! let client = MochiClient::connect("my-api-key").await?;
//! let mut spanish = client.get_deck("Spanish")?;
//! spanish.add_card("el perro", "the dog").await?;
//! spanish.update_deck("Spanish Vocab").await?;
//!
//! for name in spanish.child_names() {
//!     println!("child: {name}");
//! }
//! ```

pub mod api;
pub mod card;
pub mod client;
pub mod config;
pub mod deck;
pub mod error;
pub mod snapshot;
pub mod types;

pub use api::{HttpMochiApi, MochiApi, DEFAULT_BASE_URL};
pub use card::Card;
pub use client::MochiClient;
pub use config::{ApiConfig, Config, ConfigError, LoggingConfig};
pub use deck::Deck;
pub use error::{ApiError, ApiErrorKind, MochiError, Operation};
pub use snapshot::DeckSnapshot;
pub use types::{CardFaces, CardRecord, DeckRecord, DeckSummary};

#[cfg(any(test, feature = "test-utils"))]
pub use api::mock;
