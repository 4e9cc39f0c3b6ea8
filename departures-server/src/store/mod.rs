//! Storage tiers: volatile freshness cache, durable key-value store, and
//! the two-tier read policy that composes them.

mod durable;
mod error;
mod fresh;
mod memory;
mod read_path;

pub use durable::{DurableStore, HttpKvStore, KvStoreConfig};
pub use error::StoreError;
pub use fresh::{FreshStore, FreshStoreConfig};
pub use memory::InMemoryStore;
pub use read_path::ReadPath;

/// Prefix under which per-stop entries are keyed in both tiers.
const STOP_KEY_PREFIX: &str = "stop:";

/// Build the storage key for a stop id.
pub fn stop_key(stop_id: &str) -> String {
    format!("{STOP_KEY_PREFIX}{stop_id}")
}

/// Recover the stop id from a storage key, if it is one.
pub fn stop_id_from_key(key: &str) -> Option<&str> {
    key.strip_prefix(STOP_KEY_PREFIX).filter(|id| !id.is_empty())
}
