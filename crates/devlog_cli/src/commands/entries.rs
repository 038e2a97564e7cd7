//! Listing and editing saved entries.

use clap::Subcommand;
use devlog::{DiaryEntry, EntryPatch, EntryStore, SeaOrmEntryStore, db};
use uuid::Uuid;

use crate::commands::shared::{OutputFormat, require_login};
use crate::config::Config;
use crate::progress::short_hash;

/// Entry subcommands.
#[derive(Subcommand)]
pub(crate) enum EntriesAction {
    /// List saved entries, newest first
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Edit an entry's title, content or tags
    Edit {
        /// Entry id
        id: Uuid,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        content: Option<String>,

        /// Replace the tag list (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Delete an entry
    Delete {
        /// Entry id
        id: Uuid,
    },
}

#[derive(Debug, Clone, serde::Serialize, tabled::Tabled)]
struct EntryRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Commit")]
    commit: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

impl From<&DiaryEntry> for EntryRow {
    fn from(entry: &DiaryEntry) -> Self {
        let commit = match (&entry.commit_repo, &entry.commit_hash) {
            (Some(repo), Some(hash)) => format!("{}@{}", repo, short_hash(hash)),
            (None, Some(hash)) => short_hash(hash).to_string(),
            _ => String::new(),
        };
        Self {
            id: entry.id.to_string(),
            date: entry.created_at.format("%Y-%m-%d").to_string(),
            title: entry.title.clone(),
            commit,
            tags: entry.tags.join(", "),
        }
    }
}

pub(crate) async fn handle_entries(
    action: EntriesAction,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let owner = require_login(config)?;
    let store = SeaOrmEntryStore::new(db::connect(database_url).await?);

    match action {
        EntriesAction::List { output } => {
            let entries = store.query(&owner).await?;
            match output {
                OutputFormat::Table => {
                    if entries.is_empty() {
                        println!("No entries yet.");
                    } else {
                        let rows: Vec<EntryRow> = entries.iter().map(EntryRow::from).collect();
                        let mut table = tabled::Table::new(rows);
                        table.with(tabled::settings::Style::rounded());
                        println!("{}", table);
                    }
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&entries)?);
                }
            }
        }
        EntriesAction::Edit {
            id,
            title,
            content,
            tags,
        } => {
            let patch = EntryPatch {
                title,
                content,
                tags: (!tags.is_empty()).then_some(tags),
                is_draft: None,
            };
            if patch.is_empty() {
                return Err("Nothing to change; pass --title, --content or --tag".into());
            }
            let entry = store.update(&owner, id, patch).await?;
            println!("Updated {}", entry.id);
        }
        EntriesAction::Delete { id } => {
            store.delete(&owner, id).await?;
            println!("Deleted {}", id);
        }
    }

    Ok(())
}
