//! Feed decode and fetch error types.

/// Errors from decoding one feed format.
///
/// A decode failure is recovered at the fetcher level (by trying the
/// fallback format), never surfaced to API callers on its own.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Protobuf payload did not parse as a GTFS-RT feed message.
    #[error("protobuf decode error: {0}")]
    Protobuf(#[from] prost::DecodeError),

    /// Fallback document contained no trip-update elements at all.
    #[error("no trip updates found in fallback document")]
    EmptyDocument,

    /// A schema tag name failed to compile into a selector.
    #[error("invalid markup selector: {0}")]
    Selector(String),
}

/// Errors from one feed fetch cycle.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed (network error, timeout).
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Both the binary and the fallback format failed.
    #[error("all feed formats failed (binary: {binary}; fallback: {fallback})")]
    AllFormatsFailed { binary: String, fallback: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_formats_failed_names_both_causes() {
        let err = FetchError::AllFormatsFailed {
            binary: "HTTP 500".into(),
            fallback: "no trip updates found in fallback document".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("HTTP 500"));
        assert!(msg.contains("no trip updates"));
    }

    #[test]
    fn empty_document_display() {
        let err = DecodeError::EmptyDocument;
        assert_eq!(
            err.to_string(),
            "no trip updates found in fallback document"
        );
    }
}
