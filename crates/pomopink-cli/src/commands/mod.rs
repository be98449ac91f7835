use std::sync::Arc;

use pomopink_core::storage::{PersistentStore, SqliteStore};
use pomopink_core::{Clock, StorageError, SystemClock};

pub mod cheer;
pub mod config;
pub mod habit;
pub mod mute;
pub mod notes;
pub mod stats;
pub mod summary;
pub mod task;
pub mod timer;

/// The on-disk store under the data directory.
pub fn open_store() -> Result<Arc<dyn PersistentStore>, StorageError> {
    Ok(Arc::new(SqliteStore::open()?))
}

pub fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
