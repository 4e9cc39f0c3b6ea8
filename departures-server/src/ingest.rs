//! One ingestion cycle: fetch, normalize, write both storage tiers.
//!
//! Cycles are triggered externally and share no state beyond the stores.
//! Each cycle computes its result independently and writes per-key
//! overwrites, so concurrent or superseded cycles resolve by last write
//! wins. A durable-store failure never fails the cycle: the volatile tier
//! may already hold the fresh data.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::{Departure, StopPayload};
use crate::feed::{FeedFetcher, FetchError};
use crate::store::{DurableStore, FreshStore, stop_key};

/// Outcome of a successful ingestion cycle.
#[derive(Debug, Clone, Copy)]
pub struct CycleSummary {
    /// Stops with at least one departure written this cycle.
    pub stops_cached: usize,
    /// Wall-clock duration of the cycle.
    pub elapsed: Duration,
}

/// Runs ingestion cycles against the configured stores.
pub struct Ingestor {
    fetcher: FeedFetcher,
    fresh: Arc<FreshStore>,
    durable: Option<Arc<dyn DurableStore>>,
}

impl Ingestor {
    /// Create an ingestor writing to the given tiers.
    pub fn new(
        fetcher: FeedFetcher,
        fresh: Arc<FreshStore>,
        durable: Option<Arc<dyn DurableStore>>,
    ) -> Self {
        Self {
            fetcher,
            fresh,
            durable,
        }
    }

    /// Fetch the feed once and store the result.
    ///
    /// A `FetchError` leaves prior cache contents untouched.
    pub async fn run_cycle(&self) -> Result<CycleSummary, FetchError> {
        let started = std::time::Instant::now();
        let by_stop = self.fetcher.fetch_feed().await?;
        let summary = self.store_results(by_stop, started).await;

        info!(
            stops_cached = summary.stops_cached,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "ingestion cycle complete"
        );
        Ok(summary)
    }

    /// Write one cycle's normalized result into the storage tiers.
    pub(crate) async fn store_results(
        &self,
        by_stop: HashMap<String, Vec<Departure>>,
        started: std::time::Instant,
    ) -> CycleSummary {
        let now = Utc::now();
        let mut items = Vec::new();

        for (stop_id, departures) in by_stop {
            if departures.is_empty() {
                continue;
            }

            let key = stop_key(&stop_id);
            self.fresh.put_at(key.clone(), departures.clone(), now);
            items.push((key, StopPayload {
                updated_at: now,
                departures,
            }));
        }

        let stops_cached = items.len();

        if let Some(durable) = &self.durable {
            if !items.is_empty() {
                if let Err(e) = durable.upsert(items).await {
                    warn!(error = %e, "durable store write failed, volatile tier still updated");
                }
            }
        }

        CycleSummary {
            stops_cached,
            elapsed: started.elapsed(),
        }
    }
}
