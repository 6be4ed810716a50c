#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]
#![allow(clippy::print_stdout)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use mochi_client::{Config, MochiClient};
use tracing_subscriber::EnvFilter;

/// Manage Mochi decks and cards from the shell.
///
/// The API key is read from `MOCHI_API_KEY` or `api_key` in mochi.yaml.
#[derive(Debug, Parser)]
#[command(name = "mochi", version)]
struct Cli {
    /// Path to the YAML config file.
    #[arg(long, default_value = "mochi.yaml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List decks.
    Decks {
        /// Show ids next to names (one line per deck).
        #[arg(long)]
        ids: bool,
    },
    /// List the direct children of a deck.
    Children { deck: String },
    /// Create a deck.
    CreateDeck {
        name: String,
        /// Parent deck, by name or id.
        #[arg(long)]
        parent: Option<String>,
    },
    /// Rename a deck.
    RenameDeck { deck: String, new_name: String },
    /// Delete a deck (by name or id).
    DeleteDeck { deck: String },
    /// List the cards of a deck (by name or id).
    Cards {
        deck: String,
        /// Include card ids and raw content.
        #[arg(long)]
        full: bool,
    },
    /// Add a card to a deck.
    AddCard {
        deck: String,
        front: String,
        back: String,
    },
    /// Change the front and/or back of a card.
    UpdateCard {
        card_id: String,
        #[arg(long)]
        front: Option<String>,
        #[arg(long)]
        back: Option<String>,
    },
    /// Delete a card.
    DeleteCard { card_id: String },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.level))
        .with_writer(std::io::stderr)
        .init();

    let client = MochiClient::connect_with_config(&config.api, &config.api_key).await?;
    run(&client, cli.command).await
}

fn load_config(path: &str) -> Result<Config, anyhow::Error> {
    Config::load_from(path).with_context(|| format!("loading config from {path}"))
}

async fn run(client: &MochiClient, command: Command) -> Result<(), anyhow::Error> {
    let snapshot = client.snapshot();

    match command {
        Command::Decks { ids: false } => {
            for name in client.deck_names() {
                println!("{name}");
            }
        }
        Command::Decks { ids: true } => {
            for deck in client.get_decks() {
                println!("{}\t{}", deck.id, deck.name);
            }
        }
        Command::Children { deck } => {
            let record = snapshot.resolve(&deck)?;
            for name in client.get_deck_by_id(&record.id)?.child_names() {
                println!("{name}");
            }
        }
        Command::CreateDeck { name, parent } => {
            let parent_id = match parent {
                Some(parent) => Some(snapshot.resolve(&parent)?.id.clone()),
                None => None,
            };
            let deck = client.create_deck(&name, parent_id.as_deref()).await?;
            println!("{}", deck.id());
        }
        Command::RenameDeck { deck, new_name } => {
            let id = snapshot.resolve(&deck)?.id.clone();
            let mut deck = client.get_deck_by_id(&id)?;
            deck.update_deck(&new_name).await?;
            println!("{}\t{}", deck.id(), deck.name());
        }
        Command::DeleteDeck { deck } => {
            let id = snapshot.resolve(&deck)?.id.clone();
            client.delete_deck(&id).await?;
        }
        Command::Cards { deck, full } => {
            for card in client.get_cards(&deck).await? {
                if full {
                    println!("{}\t{:?}", card.id(), card.content());
                } else {
                    println!("{}\n---\n{}\n", card.front(), card.back());
                }
            }
        }
        Command::AddCard { deck, front, back } => {
            let id = snapshot.resolve(&deck)?.id.clone();
            let card = client.get_deck_by_id(&id)?.add_card(&front, &back).await?;
            println!("{}", card.id());
        }
        Command::UpdateCard {
            card_id,
            front,
            back,
        } => {
            let mut card = client.get_card(&card_id).await?;
            card.update(front.as_deref(), back.as_deref()).await?;
            println!("{}\n---\n{}", card.front(), card.back());
        }
        Command::DeleteCard { card_id } => {
            client.delete_card(&card_id).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_keep_their_sources() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("broken.yaml", "api: [unclosed\n")?;

            let result = load_config("broken.yaml");
            assert!(result.is_err());
            if let Err(err) = result {
                assert!(err.to_string().contains("broken.yaml"));
                assert!(err.chain().count() >= 3, "{err:?}");
            }
            Ok(())
        });
    }

    #[test]
    fn test_cli_parses_partial_card_update() {
        let cli = Cli::try_parse_from(["mochi", "update-card", "c1", "--back", "Paris"]);
        assert!(matches!(
            cli,
            Ok(Cli {
                command: Command::UpdateCard { front: None, back: Some(ref b), .. },
                ..
            }) if b == "Paris"
        ));
    }
}
