//! Data transfer objects for API responses.

use serde::Serialize;

/// Response for `GET /stops`.
#[derive(Debug, Serialize)]
pub struct StopsResponse {
    /// Stop identifiers with currently known data.
    pub stops: Vec<String>,
}

/// Error body returned by failing endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error tag (e.g. `no-data`, `cron-failed`).
    pub error: String,

    /// Optional human-readable detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    /// An error body with just a tag.
    pub fn tag(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    /// An error body with a tag and a detail message.
    pub fn with_message(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: Some(message.into()),
        }
    }
}
