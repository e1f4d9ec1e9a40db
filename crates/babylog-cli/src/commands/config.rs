use chrono::Utc;
use clap::Subcommand;

use babylog_core::{Settings, StateStore};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a settings value
    Get {
        /// Settings key (e.g. "babyName", "theme", "musicVolume")
        key: String,
    },
    /// Set a settings value
    Set {
        /// Settings key
        key: String,
        /// New value
        value: String,
    },
    /// List all settings
    List,
    /// Reset settings to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = StateStore::open()?;

    match action {
        ConfigAction::Get { key } => {
            let state = store.load();
            match state.settings.get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut state = store.load();
            state.settings.set(&key, &value)?;
            state.touch(Utc::now());
            store.save(&state)?;
            println!("ok");
        }
        ConfigAction::List => {
            let state = store.load();
            println!("{}", serde_json::to_string_pretty(&state.settings)?);
        }
        ConfigAction::Reset => {
            let mut state = store.load();
            state.settings = Settings::default();
            state.touch(Utc::now());
            store.save(&state)?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
