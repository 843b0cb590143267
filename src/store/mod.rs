pub mod entry;

use dashmap::DashMap;
use entry::Entry;
use std::sync::Arc;

/// The key space — a concurrent map from key to [`Entry`].
///
/// Every connection task, the active expiration sweeper, and the slave
/// replication link all touch the store concurrently. `DashMap` gives
/// per-key atomic read-modify-write without a lock across keys, and its
/// iteration is safe against concurrent mutation.
#[derive(Debug, Default)]
pub struct Store {
    data: DashMap<String, Entry>,
}

impl Store {
    pub fn new() -> Self {
        Store {
            data: DashMap::new(),
        }
    }

    /// Get a value, performing lazy expiration: an expired entry is
    /// removed and reported as absent. Expired data is never returned,
    /// even if the sweeper has not reached it yet.
    pub fn get(&self, key: &str) -> Option<String> {
        if self.data.remove_if(key, |_, entry| entry.is_expired()).is_some() {
            return None;
        }
        self.data.get(key).map(|entry| entry.value.clone())
    }

    /// Set a key-value pair, replacing any previous entry.
    pub fn set(&self, key: String, entry: Entry) {
        self.data.insert(key, entry);
    }

    /// Set expiry on an existing key. Returns true if the key exists.
    pub fn set_expiry(&self, key: &str, expires_at: u64) -> bool {
        match self.data.get_mut(key) {
            Some(mut entry) => {
                entry.expires_at = Some(expires_at);
                true
            }
            None => false,
        }
    }

    /// Check presence without lazy expiration (expired entries count
    /// until removed).
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Number of entries, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Run one active expiration pass: examine up to `sample_size`
    /// arbitrary entries and evict the expired ones. Returns the number
    /// of entries removed.
    ///
    /// The sample bound keeps each pass cheap; expired entries that were
    /// not sampled stay until a later pass or a lazy-expiring read.
    pub fn active_expire(&self, sample_size: usize) -> usize {
        let sampled: Vec<String> = self
            .data
            .iter()
            .take(sample_size)
            .map(|entry| entry.key().clone())
            .collect();

        let mut removed = 0;
        for key in sampled {
            if self.data.remove_if(&key, |_, entry| entry.is_expired()).is_some() {
                removed += 1;
            }
        }
        removed
    }
}

pub type SharedStore = Arc<Store>;
