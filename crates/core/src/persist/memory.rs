//! In-process remote store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use super::RemoteStore;
use crate::Error;
use crate::store::DocumentRecord;

/// Remote store kept in memory as raw JSON values.
///
/// Counts every [`RemoteStore::store`] call so callers can assert on
/// write traffic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, Value>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, including malformed ones.
    pub fn insert_raw(&self, key: impl Into<String>, value: Value) {
        self.values().insert(key.into(), value);
    }

    /// Number of `store` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    pub fn get(&self, key: &str) -> Option<DocumentRecord> {
        self.values().get(key).map(|v| DocumentRecord::from_stored(key, v))
    }

    fn values(&self) -> MutexGuard<'_, BTreeMap<String, Value>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn load_all(&self) -> Result<BTreeMap<String, DocumentRecord>, Error> {
        Ok(self
            .values()
            .iter()
            .map(|(key, value)| (key.clone(), DocumentRecord::from_stored(key, value)))
            .collect())
    }

    fn store(&self, records: BTreeMap<String, DocumentRecord>) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut values = self.values();
        for (key, record) in records {
            match serde_json::to_value(&record) {
                Ok(value) => {
                    values.insert(key, value);
                }
                Err(e) => tracing::warn!(key = %key, error = %e, "failed to encode record"),
            }
        }
    }
}
