mod memory_store;
mod sqlite_store;

pub use memory_store::MemoryKeyValueStore;
pub use sqlite_store::SqliteKeyValueStore;

use std::sync::Arc;

use anyhow::Result;
use domain::KeyValueStore;
use tracing::info;

use crate::config::{StorageConfig, StorageKind};

/// Open the configured key-value store
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>> {
    match config.kind {
        StorageKind::Sqlite => {
            info!(path = %config.path, "Opening SQLite key-value store");
            Ok(Arc::new(SqliteKeyValueStore::open(&config.path).await?))
        }
        StorageKind::Memory => {
            info!("Using in-memory key-value store (state is lost on exit)");
            Ok(Arc::new(MemoryKeyValueStore::new()))
        }
    }
}
