//! Data file maintenance: export, import, retention purge, usage and reset.

use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;

use babylog_core::backup::{auto_backup, export_to_file, merge, validate, MergeOptions};
use babylog_core::record::purge_older_than;
use babylog_core::{Event, StateStore};

const DAY_MS: i64 = 86_400_000;

#[derive(Subcommand)]
pub enum DataAction {
    /// Write the full data document to a file
    Export {
        /// Destination path
        path: PathBuf,
    },
    /// Merge a previously exported document into the current data
    Import {
        /// Source path
        path: PathBuf,
        /// Also overwrite settings with the imported ones
        #[arg(long)]
        settings: bool,
    },
    /// Write a dated backup into the data directory if the last one is
    /// older than a day
    Backup,
    /// Delete records older than a cutoff
    Purge {
        /// Age cutoff in days
        #[arg(long, default_value = "90")]
        days: i64,
    },
    /// Show how much of the storage budget the data file uses
    Usage,
    /// Delete all data
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: DataAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = StateStore::open()?;
    let now = Utc::now();

    match action {
        DataAction::Export { path } => {
            let mut state = store.load();
            let event = export_to_file(&mut state, &path, now)?;
            store.save(&state)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        DataAction::Import { path, settings } => {
            let content = std::fs::read_to_string(&path)?;
            let doc: serde_json::Value = serde_json::from_str(&content)?;
            validate(&doc)?;

            let current = store.load();
            let (merged, event) = merge(
                &current,
                &doc,
                MergeOptions {
                    include_settings: settings,
                },
                now,
            );
            store.save(&merged)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        DataAction::Backup => {
            let mut state = store.load();
            match auto_backup(&store, &mut state, now)? {
                Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
                None => println!("backup is current"),
            }
        }
        DataAction::Purge { days } => {
            let mut state = store.load();
            let cutoff = now.timestamp_millis() - days * DAY_MS;
            let removed = purge_older_than(&mut state, cutoff, now);
            store.save(&state)?;
            let event = Event::RecordsPurged { removed, at: now };
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        DataAction::Usage => {
            let usage = store.usage()?;
            println!("{}", serde_json::to_string_pretty(&usage)?);
        }
        DataAction::Clear { yes } => {
            if !yes {
                return Err("refusing to delete all data without --yes".into());
            }
            store.clear()?;
            let event = Event::DataCleared { at: now };
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
    }
    Ok(())
}
