//! Profile Store: the opaque key-value collaborator the profile and
//! settings live in. The fill engine only ever reads a snapshot of it.
//!
//! Default: `MemoryStore` (process-local, used when no Redis is configured).
//! `RedisStore` keeps every key in one hash with JSON-encoded values.

use std::collections::HashMap;

use async_trait::async_trait;
use redis::AsyncCommands;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

pub const REDIS_PROFILE_KEY: &str = "autofill:profile";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Stored value is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Every stored key.
    async fn get_all(&self) -> Result<Map<String, Value>, StoreError>;

    /// Merges `entries` into the store, overwriting keys that already exist.
    async fn set(&self, entries: Map<String, Value>) -> Result<(), StoreError>;

    /// Removes everything.
    async fn clear(&self) -> Result<(), StoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// MemoryStore
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<Map<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_all(&self) -> Result<Map<String, Value>, StoreError> {
        Ok(self.entries.read().await.clone())
    }

    async fn set(&self, entries: Map<String, Value>) -> Result<(), StoreError> {
        self.entries.write().await.extend(entries);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.entries.write().await.clear();
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RedisStore
// ────────────────────────────────────────────────────────────────────────────

pub struct RedisStore {
    client: redis::Client,
    key: String,
}

impl RedisStore {
    pub fn new(client: redis::Client) -> Self {
        Self {
            client,
            key: REDIS_PROFILE_KEY.to_string(),
        }
    }
}

#[async_trait]
impl ProfileStore for RedisStore {
    async fn get_all(&self) -> Result<Map<String, Value>, StoreError> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let raw: HashMap<String, String> = con.hgetall(&self.key).await?;

        let mut entries = Map::new();
        for (field, encoded) in raw {
            entries.insert(field, serde_json::from_str(&encoded)?);
        }
        debug!("Loaded {} profile key(s) from Redis", entries.len());
        Ok(entries)
    }

    async fn set(&self, entries: Map<String, Value>) -> Result<(), StoreError> {
        if entries.is_empty() {
            return Ok(());
        }
        let items = entries
            .into_iter()
            .map(|(field, value)| Ok((field, serde_json::to_string(&value)?)))
            .collect::<Result<Vec<(String, String)>, StoreError>>()?;

        let mut con = self.client.get_multiplexed_async_connection().await?;
        let _: () = con.hset_multiple(&self.key, items.as_slice()).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let _: () = con.del(&self.key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entries(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[tokio::test]
    async fn test_memory_store_merges() {
        let store = MemoryStore::new();
        store
            .set(entries(json!({"firstName": "Ada", "skills": ["Rust"]})))
            .await
            .unwrap();
        store
            .set(entries(json!({"skills": ["Rust", "Go"], "autoFillEnabled": false})))
            .await
            .unwrap();

        let all = store.get_all().await.unwrap();
        assert_eq!(all["firstName"], json!("Ada"));
        assert_eq!(all["skills"], json!(["Rust", "Go"]));
        assert_eq!(all["autoFillEnabled"], json!(false));
    }

    #[tokio::test]
    async fn test_memory_store_clear() {
        let store = MemoryStore::new();
        store.set(entries(json!({"email": "a@b.c"}))).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.get_all().await.unwrap().is_empty());
    }
}
