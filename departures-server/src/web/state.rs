//! Application state for the web layer.

use std::sync::Arc;

use crate::ingest::Ingestor;
use crate::store::ReadPath;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Two-tier read policy serving stop queries.
    pub read_path: Arc<ReadPath>,

    /// Ingestion runner behind the `/cron` trigger.
    pub ingestor: Arc<Ingestor>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(read_path: ReadPath, ingestor: Ingestor) -> Self {
        Self {
            read_path: Arc::new(read_path),
            ingestor: Arc::new(ingestor),
        }
    }
}
