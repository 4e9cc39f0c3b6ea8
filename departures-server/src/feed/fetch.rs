//! Feed fetch orchestration.
//!
//! Tries the binary protobuf rendition first, then the markup fallback at a
//! derived URL. Exactly one format supplies a cycle's result; a failure of
//! the binary branch alone is logged, never raised. Retry across cycles is
//! the external scheduler's job, so no backoff happens here.

use std::collections::HashMap;

use chrono::Utc;
use reqwest::header::ACCEPT;
use tracing::{debug, warn};

use crate::domain::Departure;

use super::decode::{RawStopTimeUpdate, decode_binary};
use super::error::{DecodeError, FetchError};
use super::markup::{MarkupSchema, decode_markup};
use super::normalize::normalize;

/// Content type requested from the binary rendition.
const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";

/// Query parameter appended to derive the fallback URL.
const FALLBACK_FORMAT_PARAM: &str = "format=xml";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the feed fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Base URL of the feed endpoint.
    pub base_url: String,
    /// Value of the `Type` query parameter.
    pub feed_type: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl FetchConfig {
    /// Create a new config for the given endpoint and feed type.
    pub fn new(base_url: impl Into<String>, feed_type: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            feed_type: feed_type.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Why one feed format yielded no usable result.
#[derive(Debug, thiserror::Error)]
enum FormatFailure {
    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Decode(#[from] DecodeError),
}

/// Fetches and decodes one feed snapshot per call.
#[derive(Debug, Clone)]
pub struct FeedFetcher {
    http: reqwest::Client,
    config: FetchConfig,
    schema: MarkupSchema,
}

impl FeedFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            config,
            schema: MarkupSchema::default(),
        })
    }

    fn binary_url(&self) -> String {
        format!("{}?Type={}", self.config.base_url, self.config.feed_type)
    }

    fn fallback_url(&self) -> String {
        format!("{}&{}", self.binary_url(), FALLBACK_FORMAT_PARAM)
    }

    /// Fetch one feed snapshot and normalize it into per-stop lists.
    ///
    /// The normalization instant is the completion time of whichever fetch
    /// succeeded.
    pub async fn fetch_feed(&self) -> Result<HashMap<String, Vec<Departure>>, FetchError> {
        let binary_failure = match self.fetch_binary().await {
            Ok(records) => {
                debug!(records = records.len(), "binary feed format succeeded");
                return Ok(normalize(records, Utc::now()));
            }
            Err(failure) => failure,
        };

        warn!(cause = %binary_failure, "binary feed format failed, trying fallback");

        match self.fetch_fallback().await {
            Ok(records) => {
                debug!(records = records.len(), "fallback feed format succeeded");
                Ok(normalize(records, Utc::now()))
            }
            Err(fallback_failure) => Err(FetchError::AllFormatsFailed {
                binary: binary_failure.to_string(),
                fallback: fallback_failure.to_string(),
            }),
        }
    }

    async fn fetch_binary(&self) -> Result<Vec<RawStopTimeUpdate>, FormatFailure> {
        let response = self
            .http
            .get(self.binary_url())
            .header(ACCEPT, PROTOBUF_CONTENT_TYPE)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FormatFailure::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(decode_binary(&body)?)
    }

    async fn fetch_fallback(&self) -> Result<Vec<RawStopTimeUpdate>, FormatFailure> {
        let response = self.http.get(self.fallback_url()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FormatFailure::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        Ok(decode_markup(&body, &self.schema)?)
    }
}
