//! In-memory durable store.
//!
//! Backs KV-less deployments and tests. Optionally rejects writes so the
//! "store failure never fails a cycle" policy can be exercised.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::StopPayload;

use super::durable::DurableStore;
use super::error::StoreError;

/// Map-backed implementation of [`DurableStore`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, StopPayload>>,
    fail_writes: bool,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose writes always fail with an API error.
    pub fn with_failing_writes() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            fail_writes: true,
        }
    }

    /// Number of stored items.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no items.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl DurableStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<StopPayload>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn get_all(&self) -> Result<HashMap<String, StopPayload>, StoreError> {
        Ok(self.entries.read().await.clone())
    }

    async fn upsert(&self, items: Vec<(String, StopPayload)>) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Api {
                status: 503,
                message: "writes disabled".into(),
            });
        }

        let mut entries = self.entries.write().await;
        for (key, value) in items {
            entries.insert(key, value);
        }
        Ok(())
    }
}
