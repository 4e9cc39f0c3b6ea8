//! Process configuration from environment variables.

use std::net::SocketAddr;

/// Errors raised while assembling configuration.
///
/// Missing configuration is fatal for the operation that needs it and is
/// deliberately distinct from transient fetch failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// An environment variable is set but unparseable.
    #[error("invalid value for {name}: {message}")]
    InvalidVar { name: &'static str, message: String },
}

/// Default bind address for the HTTP server.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Default timeout for feed and durable-store HTTP requests.
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Configuration for the durable key-value store.
///
/// Optional as a whole: when absent the process runs volatile-only.
#[derive(Debug, Clone)]
pub struct KvConfig {
    /// Base URL of the KV items API.
    pub endpoint: String,
    /// Bearer token for writes.
    pub token: String,
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the upstream real-time feed endpoint.
    pub feed_base_url: String,
    /// Value for the feed's `Type` query parameter (e.g. `TripUpdate`).
    pub feed_type: String,
    /// Timeout applied to outbound HTTP requests.
    pub http_timeout_secs: u64,
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Durable store settings, if configured.
    pub kv: Option<KvConfig>,
}

impl AppConfig {
    /// Build configuration from the process environment.
    ///
    /// `FEED_BASE_URL` and `FEED_TYPE` are required. `KV_ENDPOINT` and
    /// `KV_TOKEN` are read together; setting only one of them is treated
    /// as a configuration mistake.
    pub fn from_env() -> Result<Self, ConfigError> {
        let feed_base_url =
            std::env::var("FEED_BASE_URL").map_err(|_| ConfigError::MissingVar("FEED_BASE_URL"))?;
        let feed_type =
            std::env::var("FEED_TYPE").map_err(|_| ConfigError::MissingVar("FEED_TYPE"))?;

        let kv = match (std::env::var("KV_ENDPOINT"), std::env::var("KV_TOKEN")) {
            (Ok(endpoint), Ok(token)) => Some(KvConfig { endpoint, token }),
            (Ok(_), Err(_)) => return Err(ConfigError::MissingVar("KV_TOKEN")),
            (Err(_), Ok(_)) => return Err(ConfigError::MissingVar("KV_ENDPOINT")),
            (Err(_), Err(_)) => None,
        };

        let bind_addr = match std::env::var("BIND_ADDR") {
            Ok(s) => s.parse().map_err(|e| ConfigError::InvalidVar {
                name: "BIND_ADDR",
                message: format!("{e}"),
            })?,
            Err(_) => DEFAULT_BIND_ADDR.parse().unwrap(),
        };

        let http_timeout_secs = match std::env::var("FEED_TIMEOUT_SECS") {
            Ok(s) => s.parse().map_err(|e| ConfigError::InvalidVar {
                name: "FEED_TIMEOUT_SECS",
                message: format!("{e}"),
            })?,
            Err(_) => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            feed_base_url,
            feed_type,
            http_timeout_secs,
            bind_addr,
            kv,
        })
    }
}
