//! Two-tier read policy.
//!
//! The volatile tier is preferred purely for latency; the durable tier
//! covers cold starts. Durable entries are returned as-is without freshness
//! re-validation: they are written by the same ingestion cycle and are
//! expected to be superseded each run. Absence is a normal outcome, never
//! an error.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::warn;

use crate::domain::StopPayload;

use super::durable::DurableStore;
use super::fresh::FreshStore;
use super::{stop_id_from_key, stop_key};

/// Read-side composition of the volatile and durable tiers.
pub struct ReadPath {
    fresh: Arc<FreshStore>,
    durable: Option<Arc<dyn DurableStore>>,
}

impl ReadPath {
    /// Create a read path over the given tiers.
    pub fn new(fresh: Arc<FreshStore>, durable: Option<Arc<dyn DurableStore>>) -> Self {
        Self { fresh, durable }
    }

    /// Read the freshest known departures for a stop.
    ///
    /// The volatile tier wins when it holds a fresh, non-empty list;
    /// otherwise the durable tier is consulted by the same key. A durable
    /// store failure is logged and treated as absence.
    pub async fn read_stop(&self, stop_id: &str) -> Option<StopPayload> {
        let key = stop_key(stop_id);

        if let Some(payload) = self.fresh.get(&key) {
            if !payload.departures.is_empty() {
                return Some(payload);
            }
        }

        if let Some(durable) = &self.durable {
            match durable.get(&key).await {
                Ok(found) => return found,
                Err(e) => {
                    warn!(stop_id, error = %e, "durable store read failed, treating as absent");
                }
            }
        }

        None
    }

    /// All stop ids with data in either tier, sorted and deduplicated.
    ///
    /// A durable store failure degrades to the volatile tier alone.
    pub async fn list_stops(&self) -> Vec<String> {
        let mut ids: BTreeSet<String> = self
            .fresh
            .active_keys()
            .iter()
            .filter_map(|key| stop_id_from_key(key))
            .map(String::from)
            .collect();

        if let Some(durable) = &self.durable {
            match durable.get_all().await {
                Ok(items) => {
                    ids.extend(
                        items
                            .keys()
                            .filter_map(|key| stop_id_from_key(key))
                            .map(String::from),
                    );
                }
                Err(e) => {
                    warn!(error = %e, "durable store enumeration failed, listing volatile tier only");
                }
            }
        }

        ids.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DelayStatus, Departure};
    use crate::store::InMemoryStore;
    use chrono::{Duration, Utc};

    fn departure(stop_id: &str) -> Departure {
        let now = Utc::now();
        Departure {
            route_id: "RED".into(),
            trip_id: "trip_1".into(),
            stop_id: stop_id.into(),
            scheduled_time: now,
            predicted_time: now,
            delay_seconds: 0,
            vehicle_id: None,
            status: DelayStatus::OnTime,
        }
    }

    fn payload(stop_id: &str) -> StopPayload {
        StopPayload {
            updated_at: Utc::now(),
            departures: vec![departure(stop_id)],
        }
    }

    #[tokio::test]
    async fn fresh_tier_wins_when_populated() {
        let fresh = Arc::new(FreshStore::default());
        fresh.put(stop_key("72"), vec![departure("72")]);
        let durable = Arc::new(InMemoryStore::new());
        durable
            .upsert(vec![(stop_key("72"), payload("72"))])
            .await
            .unwrap();

        let read_path = ReadPath::new(fresh, Some(durable));
        let got = read_path.read_stop("72").await.unwrap();
        assert_eq!(got.departures[0].stop_id, "72");
    }

    #[tokio::test]
    async fn falls_back_to_durable_when_volatile_expired() {
        let fresh = Arc::new(FreshStore::default());
        fresh.put_at(
            stop_key("72"),
            vec![departure("72")],
            Utc::now() - Duration::minutes(10),
        );
        let durable = Arc::new(InMemoryStore::new());
        durable
            .upsert(vec![(stop_key("72"), payload("72"))])
            .await
            .unwrap();

        let read_path = ReadPath::new(fresh.clone(), Some(durable));
        assert!(read_path.read_stop("72").await.is_some());
        // The expired volatile entry was lazily evicted by the read.
        assert_eq!(fresh.len(), 0);
    }

    #[tokio::test]
    async fn empty_volatile_list_falls_through() {
        let fresh = Arc::new(FreshStore::default());
        fresh.put(stop_key("72"), vec![]);
        let durable = Arc::new(InMemoryStore::new());
        durable
            .upsert(vec![(stop_key("72"), payload("72"))])
            .await
            .unwrap();

        let read_path = ReadPath::new(fresh, Some(durable));
        let got = read_path.read_stop("72").await.unwrap();
        assert_eq!(got.departures.len(), 1);
    }

    #[tokio::test]
    async fn absent_everywhere_is_none() {
        let read_path = ReadPath::new(
            Arc::new(FreshStore::default()),
            Some(Arc::new(InMemoryStore::new())),
        );
        assert!(read_path.read_stop("000").await.is_none());
    }

    #[tokio::test]
    async fn works_without_a_durable_tier() {
        let fresh = Arc::new(FreshStore::default());
        fresh.put(stop_key("72"), vec![departure("72")]);

        let read_path = ReadPath::new(fresh, None);
        assert!(read_path.read_stop("72").await.is_some());
        assert!(read_path.read_stop("14").await.is_none());
    }

    #[tokio::test]
    async fn list_stops_unions_and_dedupes() {
        let fresh = Arc::new(FreshStore::default());
        fresh.put(stop_key("72"), vec![departure("72")]);
        fresh.put(stop_key("14"), vec![departure("14")]);
        let durable = Arc::new(InMemoryStore::new());
        durable
            .upsert(vec![
                (stop_key("72"), payload("72")),
                (stop_key("9"), payload("9")),
            ])
            .await
            .unwrap();

        let read_path = ReadPath::new(fresh, Some(durable));
        assert_eq!(
            read_path.list_stops().await,
            vec!["14".to_string(), "72".into(), "9".into()]
        );
    }

    #[tokio::test]
    async fn list_stops_skips_expired_volatile_entries() {
        let fresh = Arc::new(FreshStore::default());
        fresh.put_at(
            stop_key("72"),
            vec![departure("72")],
            Utc::now() - Duration::minutes(10),
        );
        fresh.put(stop_key("14"), vec![departure("14")]);

        let read_path = ReadPath::new(fresh, None);
        assert_eq!(read_path.list_stops().await, vec!["14".to_string()]);
    }
}
