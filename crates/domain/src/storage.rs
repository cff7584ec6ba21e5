use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A persisted value: counters are integers, the printer address is text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoredValue {
    Int(u32),
    Text(String),
}

impl StoredValue {
    pub fn as_int(&self) -> Option<u32> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            Self::Int(_) => None,
        }
    }
}

/// Process-durable key-value persistence
///
/// A missing key means "default": `0` for counters, unset for the address.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, DomainError>;

    /// Write all entries as one atomic unit: either every entry is stored or none
    async fn put_all(&self, entries: Vec<(String, StoredValue)>) -> Result<(), DomainError>;
}
