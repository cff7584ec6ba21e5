use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use domain::{DomainError, KeyValueStore, StoredValue};

/// Volatile store for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, StoredValue>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, StoredValue)>,
        K: Into<String>,
    {
        Self {
            entries: Mutex::new(entries.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    /// Copy of the current contents
    pub fn dump(&self) -> HashMap<String, StoredValue> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, DomainError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| DomainError::Storage("memory store poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn put_all(&self, entries: Vec<(String, StoredValue)>) -> Result<(), DomainError> {
        let mut stored = self
            .entries
            .lock()
            .map_err(|_| DomainError::Storage("memory store poisoned".to_string()))?;
        stored.extend(entries);
        Ok(())
    }
}
