//! Volatile freshness cache.
//!
//! A concurrent map from storage key to `(updated_at, departures)` with a
//! fixed freshness window. Eviction is lazy: the read or enumeration that
//! finds an entry expired deletes it. There is no background sweep, and the
//! deletions are observable through `len()`.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::domain::{Departure, StopPayload};

/// Freshness window: entries older than this are logically absent.
const DEFAULT_TTL_SECS: i64 = 5 * 60;

/// Configuration for the freshness cache.
#[derive(Debug, Clone)]
pub struct FreshStoreConfig {
    /// How long an entry stays fresh after its write.
    pub ttl: Duration,
}

impl Default for FreshStoreConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(DEFAULT_TTL_SECS),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    updated_at: DateTime<Utc>,
    departures: Vec<Departure>,
}

/// In-process freshness-bounded store keyed by `stop:<id>`.
///
/// Writes are unconditional per-key overwrites (last writer wins), which
/// keeps concurrent ingestion cycles safe without any cross-key locking.
#[derive(Debug)]
pub struct FreshStore {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl FreshStore {
    /// Create a store with the given configuration.
    pub fn new(config: &FreshStoreConfig) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: config.ttl,
        }
    }

    fn expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.updated_at > self.ttl
    }

    /// Store departures for a key, stamped with the current instant.
    pub fn put(&self, key: impl Into<String>, departures: Vec<Departure>) {
        self.put_at(key, departures, Utc::now());
    }

    /// Store departures for a key with an explicit write instant.
    pub fn put_at(&self, key: impl Into<String>, departures: Vec<Departure>, now: DateTime<Utc>) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                updated_at: now,
                departures,
            },
        );
    }

    /// Read a key, treating the current instant as "now".
    pub fn get(&self, key: &str) -> Option<StopPayload> {
        self.get_at(key, Utc::now())
    }

    /// Read a key relative to an explicit instant.
    ///
    /// An expired entry is deleted before returning `None`; the deletion is
    /// visible through `len()`.
    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<StopPayload> {
        if self
            .entries
            .remove_if(key, |_, entry| self.expired(entry, now))
            .is_some()
        {
            return None;
        }

        self.entries.get(key).map(|entry| StopPayload {
            updated_at: entry.updated_at,
            departures: entry.departures.clone(),
        })
    }

    /// All keys with fresh entries, sorted.
    pub fn active_keys(&self) -> Vec<String> {
        self.active_keys_at(Utc::now())
    }

    /// All keys fresh relative to an explicit instant, sorted.
    ///
    /// Every expired entry visited is deleted, so calling this twice with
    /// no intervening writes returns the same set and performs no further
    /// deletions.
    pub fn active_keys_at(&self, now: DateTime<Utc>) -> Vec<String> {
        self.entries.retain(|_, entry| !self.expired(entry, now));

        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Remove every entry regardless of freshness.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of physically present entries, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FreshStore {
    fn default() -> Self {
        Self::new(&FreshStoreConfig::default())
    }
}
