use std::{
    io::{self, BufRead, Write},
    sync::Arc,
};

use admin_core::{view, CollectionEditor, HttpCollectionStore};
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use shared::domain::{CollectionKind, EntryId, MoveDirection};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the collection in display order.
    List { collection: String },
    /// Create an entry from a JSON body, e.g. '{"kind":"achievement","title":"Science fair"}'.
    Create { collection: String, body: String },
    /// Change one field of an existing entry and save (dot paths allowed).
    SetField {
        collection: String,
        id: String,
        path: String,
        value: String,
    },
    /// Move an entry one step: direction is "up" or "down".
    Move {
        collection: String,
        id: String,
        direction: String,
    },
    /// Delete an entry. Asks for confirmation unless --yes is passed.
    Delete {
        collection: String,
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Derived stats: entry count, featured count, most recent entry.
    Summary { collection: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let cli = Cli::parse();

    let store = Arc::new(HttpCollectionStore::new(&cli.server_url)?);

    match cli.command {
        Command::List { collection } => {
            let mut editor = CollectionEditor::new(store, parse_collection(&collection)?);
            editor.refresh().await?;
            print_rows(&editor);
        }
        Command::Create { collection, body } => {
            let mut editor = CollectionEditor::new(store, parse_collection(&collection)?);
            editor.begin_create(serde_json::from_str(&body)?);
            let saved = editor.save().await?;
            println!("created entry id={} order={}", saved.id, saved.order);
        }
        Command::SetField {
            collection,
            id,
            path,
            value,
        } => {
            let mut editor = CollectionEditor::new(store, parse_collection(&collection)?);
            editor.refresh().await?;
            editor.begin_edit(&EntryId(id))?;
            editor.update_draft_field(&path, parse_value(value))?;
            let saved = editor.save().await?;
            println!("updated entry id={}", saved.id);
        }
        Command::Move {
            collection,
            id,
            direction,
        } => {
            let mut editor = CollectionEditor::new(store, parse_collection(&collection)?);
            editor
                .move_entry(&EntryId(id), parse_direction(&direction)?)
                .await?;
            print_rows(&editor);
        }
        Command::Delete {
            collection,
            id,
            yes,
        } => {
            let id = EntryId(id);
            if !yes && !confirm_deletion(&id)? {
                println!("aborted");
                return Ok(());
            }
            let mut editor = CollectionEditor::new(store, parse_collection(&collection)?);
            editor.remove(&id).await?;
            println!("deleted entry id={id}");
        }
        Command::Summary { collection } => {
            let mut editor = CollectionEditor::new(store, parse_collection(&collection)?);
            editor.refresh().await?;
            println!("entries: {}", editor.entries().len());
            println!("featured: {}", view::featured_count(editor.entries()));
            match view::most_recent(editor.entries()) {
                Some(entry) => println!("most recent: {}", entry.body.headline()),
                None => println!("most recent: none"),
            }
        }
    }

    Ok(())
}

fn parse_collection(slug: &str) -> Result<CollectionKind> {
    CollectionKind::from_slug(slug).ok_or_else(|| anyhow!("unknown collection '{slug}'"))
}

fn parse_direction(raw: &str) -> Result<MoveDirection> {
    if raw.eq_ignore_ascii_case("up") {
        Ok(MoveDirection::Up)
    } else if raw.eq_ignore_ascii_case("down") {
        Ok(MoveDirection::Down)
    } else {
        Err(anyhow!("direction must be 'up' or 'down', got '{raw}'"))
    }
}

/// Bare words become JSON strings so titles don't need shell-escaped quotes.
fn parse_value(raw: String) -> serde_json::Value {
    serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw))
}

fn confirm_deletion(id: &EntryId) -> Result<bool> {
    print!("Delete entry '{id}'? [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn print_rows(editor: &CollectionEditor) {
    let rows = view::display_order(editor.entries());
    for (index, entry) in rows.iter().enumerate() {
        let controls = view::row_controls(rows.len(), index);
        let up = if controls.can_move_up { "up" } else { "  " };
        let down = if controls.can_move_down { "down" } else { "    " };
        println!(
            "{:>3}. {} [{up} {down}] id={}",
            entry.order,
            entry.body.headline(),
            entry.id
        );
    }
}
