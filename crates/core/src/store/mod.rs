//! Bounded, recency-ordered document store.
//!
//! The store maps document ids to records and keeps at most `capacity`
//! of them. Inserting a new id into a full store evicts the record with
//! the lowest recency. Equal recencies are broken by first-seen order:
//! the earlier-seen record is evicted first and listed last.

use std::collections::HashMap;

mod record;
mod recency;

pub use recency::RecencySource;
pub use record::{DocumentRecord, DocumentUpdate, Recency};

/// Default number of tracked documents.
pub const MAX_DOCS: usize = 100;

/// What an upsert did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// A previously unseen id was added, possibly evicting another record.
    Inserted { evicted: Option<DocumentRecord> },
    /// An existing record was overwritten.
    Updated { previous: DocumentRecord },
    /// The incoming recency was older than the stored one; nothing changed.
    Stale,
}

/// Result of [`RecencyStore::upsert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// The record as it stands after the call.
    pub record: DocumentRecord,
    pub change: Change,
    /// Copied from the update; see [`DocumentUpdate::authoritative`].
    pub authoritative: bool,
}

impl UpsertOutcome {
    pub fn is_stale(&self) -> bool {
        matches!(self.change, Change::Stale)
    }

    /// Record pushed out of the store to make room, if any.
    pub fn evicted(&self) -> Option<&DocumentRecord> {
        match &self.change {
            Change::Inserted { evicted } => evicted.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    record: DocumentRecord,
    first_seen: u64,
}

/// Capacity-bounded id to record map with least-recently-updated eviction.
#[derive(Debug, Clone)]
pub struct RecencyStore {
    entries: HashMap<String, Entry>,
    capacity: usize,
    next_seq: u64,
}

impl Default for RecencyStore {
    fn default() -> Self {
        Self::new(MAX_DOCS)
    }
}

impl RecencyStore {
    /// Create an empty store. A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        Self { entries: HashMap::new(), capacity: capacity.max(1), next_seq: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&DocumentRecord> {
        self.entries.get(id).map(|e| &e.record)
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.next_seq = 0;
    }

    /// Insert or update a record.
    ///
    /// Unknown ids are inserted, evicting the minimum-recency record first
    /// when the store is full. Known ids are overwritten unless the incoming
    /// recency is strictly older than the stored one, in which case the
    /// stored record is returned untouched.
    pub fn upsert(&mut self, update: DocumentUpdate) -> UpsertOutcome {
        let authoritative = update.authoritative;

        if let Some(entry) = self.entries.get_mut(&update.id) {
            if update.recency < entry.record.recency {
                return UpsertOutcome { record: entry.record.clone(), change: Change::Stale, authoritative };
            }
            let previous = std::mem::replace(&mut entry.record, update.into_record());
            return UpsertOutcome { record: entry.record.clone(), change: Change::Updated { previous }, authoritative };
        }

        let evicted = if self.entries.len() >= self.capacity { self.evict_oldest() } else { None };

        let record = update.into_record();
        let first_seen = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(record.id.clone(), Entry { record: record.clone(), first_seen });

        UpsertOutcome { record, change: Change::Inserted { evicted }, authoritative }
    }

    /// All ids, freshest first.
    pub fn recent_ids(&self) -> Vec<String> {
        self.ordered().into_iter().map(|e| e.record.id.clone()).collect()
    }

    /// All records, freshest first.
    pub fn records(&self) -> Vec<&DocumentRecord> {
        self.ordered().into_iter().map(|e| &e.record).collect()
    }

    fn ordered(&self) -> Vec<&Entry> {
        let mut entries: Vec<&Entry> = self.entries.values().collect();
        entries.sort_by(|a, b| {
            b.record
                .recency
                .cmp(&a.record.recency)
                .then_with(|| b.first_seen.cmp(&a.first_seen))
        });
        entries
    }

    fn evict_oldest(&mut self) -> Option<DocumentRecord> {
        let oldest = self
            .entries
            .values()
            .min_by_key(|e| (e.record.recency, e.first_seen))
            .map(|e| e.record.id.clone())?;

        let removed = self.entries.remove(&oldest).map(|e| e.record);
        tracing::debug!(id = %oldest, "evicted least recently updated document");
        removed
    }
}
