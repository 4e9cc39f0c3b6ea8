//! Durable key-value store contract and its HTTP implementation.
//!
//! The durable tier survives process restarts; it is consumed only through
//! the narrow get / get-all / upsert contract so deployments can swap the
//! backing service (or run without one).

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::StopPayload;

use super::error::StoreError;

/// Narrow contract against the durable key-value collaborator.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Fetch one value by key.
    async fn get(&self, key: &str) -> Result<Option<StopPayload>, StoreError>;

    /// Fetch every stored item.
    async fn get_all(&self) -> Result<HashMap<String, StopPayload>, StoreError>;

    /// Write or overwrite a batch of items.
    async fn upsert(&self, items: Vec<(String, StopPayload)>) -> Result<(), StoreError>;
}

/// Default timeout for store requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the HTTP-backed key-value store.
#[derive(Debug, Clone)]
pub struct KvStoreConfig {
    /// Base URL of the store's items API.
    pub endpoint: String,
    /// Bearer token used for writes.
    pub token: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl KvStoreConfig {
    /// Create a new config for the given endpoint and token.
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// One element of the upsert wire payload.
#[derive(Debug, Serialize)]
struct UpsertItem {
    operation: &'static str,
    key: String,
    value: StopPayload,
}

impl UpsertItem {
    fn new(key: String, value: StopPayload) -> Self {
        Self {
            operation: "upsert",
            key,
            value,
        }
    }
}

/// HTTP client for a remote key-value items API.
///
/// Reads `GET {endpoint}/item/{key}` and `GET {endpoint}/items`; writes a
/// batched `PATCH {endpoint}/items` of upsert operations.
#[derive(Debug, Clone)]
pub struct HttpKvStore {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl HttpKvStore {
    /// Create a new store client with the given configuration.
    pub fn new(config: KvStoreConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint,
            token: config.token,
        })
    }

    fn item_url(&self, key: &str) -> String {
        format!("{}/item/{}", self.endpoint, key)
    }

    fn items_url(&self) -> String {
        format!("{}/items", self.endpoint)
    }
}

#[async_trait]
impl DurableStore for HttpKvStore {
    async fn get(&self, key: &str) -> Result<Option<StopPayload>, StoreError> {
        let response = self.http.get(self.item_url(key)).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload = response
            .json::<StopPayload>()
            .await
            .map_err(|e| StoreError::Payload {
                message: e.to_string(),
            })?;
        Ok(Some(payload))
    }

    async fn get_all(&self) -> Result<HashMap<String, StopPayload>, StoreError> {
        let response = self.http.get(self.items_url()).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<HashMap<String, StopPayload>>()
            .await
            .map_err(|e| StoreError::Payload {
                message: e.to_string(),
            })
    }

    async fn upsert(&self, items: Vec<(String, StopPayload)>) -> Result<(), StoreError> {
        let payload: Vec<UpsertItem> = items
            .into_iter()
            .map(|(key, value)| UpsertItem::new(key, value))
            .collect();

        let response = self
            .http
            .patch(self.items_url())
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
