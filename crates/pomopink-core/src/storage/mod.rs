//! Persistent key/value storage.
//!
//! Every component mirrors its state into a [`PersistentStore`] as JSON text
//! under one of the [`keys`]. Backends:
//! - [`MemoryStore`]: in-process map, used by tests and dry runs
//! - [`SqliteStore`]: `kv` table in `pomopink.db` under [`data_dir`]

mod config;
pub mod database;
pub mod memory;

pub use config::{CaptionConfig, Config, TimerConfig};
pub use database::SqliteStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StorageError};

/// Storage keys shared by all components.
pub mod keys {
    pub const TASKS: &str = "pomodoro-tasks";
    pub const NOTES: &str = "pomodoro-notes";
    pub const DAILY_STATS: &str = "pomodoro-daily-stats";
    pub const HABITS: &str = "pomodoro-habits";
    pub const MUTED: &str = "pomodoro-muted";
    pub const LAST_CAPTION_TS: &str = "pomodoro-last-cheer-ts";
    /// Mode of the countdown a running `timer run` is showing.
    pub const ACTIVE_MODE: &str = "pomodoro-active-mode";
}

/// Durable string-keyed storage. Values are opaque JSON text.
pub trait PersistentStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Remove every key.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Read and deserialize a JSON value.
///
/// A record that no longer parses is logged and treated as missing, so a
/// corrupt entry never blocks the component that owns it.
pub fn load_json<T: DeserializeOwned>(store: &dyn PersistentStore, key: &str) -> Result<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding unreadable persisted record");
            Ok(None)
        }
    }
}

/// Serialize and write a JSON value.
pub fn save_json<T: Serialize + ?Sized>(store: &dyn PersistentStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)?;
    Ok(())
}

/// Returns the data directory, creating it if needed.
///
/// `POMOPINK_DATA_DIR` overrides the location; otherwise
/// `~/.config/pomopink[-dev]/` based on `POMOPINK_ENV`.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("POMOPINK_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("POMOPINK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomopink-dev")
            } else {
                base_dir.join("pomopink")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
