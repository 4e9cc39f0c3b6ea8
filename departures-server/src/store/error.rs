//! Durable store error types.

/// Errors from the durable key-value store.
///
/// These are logged and degraded around rather than failing an ingestion
/// cycle or a read: the volatile tier may still hold the answer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// HTTP request failed (network error, timeout).
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store API returned an error status.
    #[error("store API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Stored value did not deserialize into the expected payload shape.
    #[error("store payload parse error: {message}")]
    Payload { message: String },
}
