use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use domain::{DomainError, KeyValueStore, StoredValue};
use sqlx::{Pool, Row, Sqlite, sqlite::SqlitePoolOptions};

const KIND_INT: &str = "int";
const KIND_TEXT: &str = "text";

#[derive(Clone)]
pub struct SqliteKeyValueStore {
    pool: Pool<Sqlite>,
}

impl SqliteKeyValueStore {
    pub async fn new(connection_string: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1) // SQLite is single-writer
            .connect(connection_string)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    /// Open (or create) a database file, creating its directory if needed
    pub async fn open(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Self::new(&format!("sqlite://{}?mode=rwc", path)).await
    }

    pub async fn in_memory() -> Result<Self> {
        Self::new("sqlite::memory:").await
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_store")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn storage_error(e: sqlx::Error) -> DomainError {
    DomainError::Storage(e.to_string())
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, DomainError> {
        let row = sqlx::query("SELECT kind, value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let kind: String = row.get(0);
        let value: String = row.get(1);
        match kind.as_str() {
            KIND_INT => value.parse().map(StoredValue::Int).map(Some).map_err(|_| {
                DomainError::Storage(format!("Key {key} holds non-integer {value:?}"))
            }),
            _ => Ok(Some(StoredValue::Text(value))),
        }
    }

    async fn put_all(&self, entries: Vec<(String, StoredValue)>) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        for (key, value) in &entries {
            let (kind, text) = match value {
                StoredValue::Int(v) => (KIND_INT, v.to_string()),
                StoredValue::Text(t) => (KIND_TEXT, t.clone()),
            };
            sqlx::query(
                "INSERT INTO kv_store (key, kind, value, updated_at)
                 VALUES (?, ?, ?, strftime('%s','now'))
                 ON CONFLICT(key) DO UPDATE SET
                    kind = excluded.kind,
                    value = excluded.value,
                    updated_at = excluded.updated_at",
            )
            .bind(key)
            .bind(kind)
            .bind(text)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;
        }

        // Dropping the transaction on an early return rolls everything back
        tx.commit().await.map_err(storage_error)?;
        Ok(())
    }
}
