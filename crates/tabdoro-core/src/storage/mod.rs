mod config;
pub mod database;
mod store;

pub use config::{Config, NotificationsConfig};
pub use database::{Database, PhaseRecord, Stats};
pub use store::{load_session, save_session, KvStore, MemoryStore, SESSION_KEY};

use std::path::PathBuf;

use crate::error::CoreError;

/// Returns `~/.config/tabdoro[-dev]/` based on TABDORO_ENV.
///
/// Set TABDORO_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TABDORO_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("tabdoro-dev")
    } else {
        base_dir.join("tabdoro")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
