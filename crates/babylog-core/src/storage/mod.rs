mod state;
mod store;

pub use state::{Settings, State};
pub use store::{StateStore, StorageUsage, STORAGE_BUDGET_BYTES};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns `~/.config/babylog[-dev]/` based on BABYLOG_ENV.
///
/// Set BABYLOG_ENV=dev to use the development data directory, or
/// BABYLOG_DATA_DIR to an absolute path to override the location entirely
/// (tests and scripting).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = if let Ok(custom) = std::env::var("BABYLOG_DATA_DIR") {
        PathBuf::from(custom)
    } else {
        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config");
        let env = std::env::var("BABYLOG_ENV").unwrap_or_else(|_| "production".to_string());
        if env == "dev" {
            base_dir.join("babylog-dev")
        } else {
            base_dir.join("babylog")
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDirUnavailable(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
