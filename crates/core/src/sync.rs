//! Synchronization between live observations, the store and the remote store.
//!
//! Two producers feed the [`RecencyStore`]:
//!
//! - **Live observation** ([`DocTracker::track`]): authoritative writes that
//!   may propagate to the remote store, debounced per id.
//! - **Reconciliation** ([`DocTracker::reconcile`]): the startup bulk load,
//!   applied non-authoritatively so it never writes back.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::config::AppConfig;
use crate::persist::RemoteStore;
use crate::query;
use crate::store::{Change, DocumentRecord, DocumentUpdate, RecencySource, RecencyStore, UpsertOutcome};
use crate::title::strip_title;

/// Totals from one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Records received from the remote store.
    pub loaded: usize,
    /// Records inserted or updated.
    pub applied: usize,
    /// Records skipped because the store already held something fresher,
    /// or because the id was observed live under a session-local counter.
    pub stale: usize,
    /// Records whose future recency was clamped to the local clock.
    pub clamped: usize,
}

/// Owns the store and decides what reaches the remote store.
pub struct DocTracker {
    store: RecencyStore,
    recency: RecencySource,
    remote: Arc<dyn RemoteStore>,
    persist_interval: Duration,
    last_persisted: HashMap<String, DateTime<Utc>>,
    live: HashSet<String>,
}

impl std::fmt::Debug for DocTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocTracker")
            .field("store", &self.store)
            .field("recency", &self.recency)
            .field("persist_interval", &self.persist_interval)
            .finish_non_exhaustive()
    }
}

impl DocTracker {
    pub fn new(config: &AppConfig, remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            store: RecencyStore::new(config.max_docs),
            recency: RecencySource::from_strategy(config.recency),
            remote,
            persist_interval: config.persist_interval(),
            last_persisted: HashMap::new(),
            live: HashSet::new(),
        }
    }

    pub fn store(&self) -> &RecencyStore {
        &self.store
    }

    /// Handle to the remote store, for loading outside a lock.
    pub fn remote(&self) -> Arc<dyn RemoteStore> {
        Arc::clone(&self.remote)
    }

    /// Matching records, freshest first.
    pub fn search(&self, text: &str, limit: usize) -> Vec<&DocumentRecord> {
        query::search(&self.store, text, limit)
    }

    /// Record a live observation of a document.
    ///
    /// The title is normalized and the recency stamped from `now`. The
    /// resulting record is written to the remote store when it is new, when
    /// its title, url or kind changed, or when the persist interval has
    /// passed since its last write.
    pub fn track(&mut self, url: &str, title: &str, kind: &str, id: &str, now: DateTime<Utc>) -> UpsertOutcome {
        let update = DocumentUpdate {
            id: id.to_string(),
            url: url.to_string(),
            title: strip_title(title).to_string(),
            kind: kind.to_string(),
            recency: self.recency.stamp(now),
            authoritative: true,
        };
        let outcome = self.apply(update);
        self.live.insert(outcome.record.id.clone());

        if self.should_persist(&outcome, now) {
            self.last_persisted.insert(outcome.record.id.clone(), now);
            self.remote
                .store(BTreeMap::from([(outcome.record.id.clone(), outcome.record.clone())]));
        } else {
            tracing::debug!(id, stale = outcome.is_stale(), "remote write suppressed");
        }

        outcome
    }

    /// Merge a bulk-loaded snapshot into the store without writing back.
    ///
    /// Records are applied oldest first so capacity eviction keeps the
    /// freshest ones. Recencies pass through the recency source, which
    /// clamps future clock values to `now`. Under a counter, stamps from an
    /// earlier process are not comparable with this session's, so ids already
    /// observed live are left alone.
    pub fn reconcile(&mut self, loaded: BTreeMap<String, DocumentRecord>, now: DateTime<Utc>) -> ReconcileReport {
        let mut report = ReconcileReport { loaded: loaded.len(), ..Default::default() };

        let mut records: Vec<DocumentRecord> = loaded.into_values().collect();
        records.sort_by_key(|r| r.recency);

        for mut record in records {
            let admitted = self.recency.admit(record.recency, now);
            if admitted != record.recency {
                tracing::debug!(id = %record.id, from = record.recency.value(), to = admitted.value(), "clamped future recency");
                report.clamped += 1;
                record.recency = admitted;
            }

            if self.recency.is_session_local() && self.live.contains(&record.id) {
                tracing::debug!(id = %record.id, "kept live observation over loaded record");
                report.stale += 1;
                continue;
            }

            let outcome = self.apply(record.into_update(false));
            if outcome.is_stale() {
                report.stale += 1;
            } else {
                report.applied += 1;
            }
        }

        tracing::info!(
            loaded = report.loaded,
            applied = report.applied,
            stale = report.stale,
            clamped = report.clamped,
            "reconciled remote documents"
        );
        report
    }

    /// Load everything from `remote`.
    ///
    /// A failed load is logged and treated as an empty snapshot. This takes
    /// no tracker so callers can load without holding a lock on one.
    pub async fn load_remote(remote: &dyn RemoteStore) -> BTreeMap<String, DocumentRecord> {
        match remote.load_all().await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load remote documents");
                BTreeMap::new()
            }
        }
    }

    /// Load everything from the remote store and reconcile it.
    pub async fn load_and_reconcile(&mut self, now: DateTime<Utc>) -> ReconcileReport {
        let loaded = Self::load_remote(self.remote.as_ref()).await;
        self.reconcile(loaded, now)
    }

    fn apply(&mut self, update: DocumentUpdate) -> UpsertOutcome {
        let outcome = self.store.upsert(update);
        if let Some(evicted) = outcome.evicted() {
            self.last_persisted.remove(&evicted.id);
            self.live.remove(&evicted.id);
        }
        outcome
    }

    fn should_persist(&self, outcome: &UpsertOutcome, now: DateTime<Utc>) -> bool {
        if !outcome.authoritative {
            return false;
        }

        match &outcome.change {
            Change::Stale => false,
            Change::Inserted { .. } => true,
            Change::Updated { previous } => {
                let record = &outcome.record;
                if previous.title != record.title || previous.url != record.url || previous.kind != record.kind {
                    return true;
                }
                self.last_persisted
                    .get(&record.id)
                    .is_none_or(|at| now - *at >= self.persist_interval)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecencyStrategy;
    use crate::persist::MemoryStore;
    use crate::store::Recency;
    use chrono::TimeZone;
    use serde_json::json;

    const URL: &str = "https://docs.google.com/document/d/abc/edit";

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn tracker(config: AppConfig) -> (DocTracker, Arc<MemoryStore>) {
        let remote = Arc::new(MemoryStore::new());
        let tracker = DocTracker::new(&config, remote.clone());
        (tracker, remote)
    }

    fn record(id: &str, recency: i64) -> DocumentRecord {
        DocumentRecord {
            id: id.to_string(),
            url: format!("https://docs.google.com/document/d/{id}/edit"),
            title: format!("Doc {id}"),
            kind: "document".to_string(),
            recency: Recency(recency),
        }
    }

    #[test]
    fn test_track_strips_title_and_stamps_clock() {
        let (mut tracker, remote) = tracker(AppConfig::default());
        let outcome = tracker.track(URL, "Budget Plan - Google Sheets", "spreadsheets", "abc", at(0));

        assert_eq!(outcome.record.title, "Budget Plan");
        assert_eq!(outcome.record.recency, Recency(at(0).timestamp_millis()));
        assert_eq!(remote.writes(), 1);
        assert_eq!(remote.get("abc").unwrap().title, "Budget Plan");
    }

    #[test]
    fn test_unchanged_write_debounced() {
        let (mut tracker, remote) = tracker(AppConfig::default());
        tracker.track(URL, "Notes", "document", "abc", at(0));
        tracker.track(URL, "Notes", "document", "abc", at(5));
        tracker.track(URL, "Notes", "document", "abc", at(14));
        assert_eq!(remote.writes(), 1);

        tracker.track(URL, "Notes", "document", "abc", at(15));
        assert_eq!(remote.writes(), 2);

        // Local recency still advances while writes are suppressed.
        assert_eq!(tracker.store().get("abc").unwrap().recency, Recency(at(15).timestamp_millis()));
    }

    #[test]
    fn test_changed_title_persists_immediately() {
        let (mut tracker, remote) = tracker(AppConfig::default());
        tracker.track(URL, "Notes", "document", "abc", at(0));
        tracker.track(URL, "Notes v2", "document", "abc", at(1));
        assert_eq!(remote.writes(), 2);
        assert_eq!(remote.get("abc").unwrap().title, "Notes v2");
    }

    #[test]
    fn test_stale_live_update_not_persisted() {
        let (mut tracker, remote) = tracker(AppConfig::default());
        tracker.track(URL, "Fresh", "document", "abc", at(100));
        let outcome = tracker.track(URL, "Old", "document", "abc", at(50));

        assert!(outcome.is_stale());
        assert_eq!(outcome.record.title, "Fresh");
        assert_eq!(remote.writes(), 1);
    }

    #[test]
    fn test_reconcile_never_writes() {
        let (mut tracker, remote) = tracker(AppConfig::default());
        let loaded = (0..30).map(|i| (format!("d{i}"), record(&format!("d{i}"), i))).collect();

        let report = tracker.reconcile(loaded, at(0));

        assert_eq!(report.loaded, 30);
        assert_eq!(report.applied, 30);
        assert_eq!(tracker.store().len(), 30);
        assert_eq!(remote.writes(), 0);
    }

    #[tokio::test]
    async fn test_load_and_reconcile_never_writes() {
        let (mut tracker, remote) = tracker(AppConfig::default());
        remote.insert_raw("a", json!({ "id": "a", "url": URL, "title": "A", "type": "document", "recency": 5 }));
        remote.insert_raw("b", json!({ "title": "B", "recency": "bad" }));

        let report = tracker.load_and_reconcile(at(0)).await;

        assert_eq!(report.applied, 2);
        assert_eq!(remote.writes(), 0);
        assert_eq!(tracker.store().get("b").unwrap().title, "B");
        assert_eq!(tracker.store().get("b").unwrap().recency, Recency(0));
    }

    #[test]
    fn test_reconcile_clamps_future_recency() {
        let (mut tracker, _remote) = tracker(AppConfig::default());
        let now = at(0);
        let future = now.timestamp_millis() + 3_600_000;
        let loaded = BTreeMap::from([("abc".to_string(), record("abc", future))]);

        let report = tracker.reconcile(loaded, now);

        assert_eq!(report.clamped, 1);
        assert_eq!(tracker.store().get("abc").unwrap().recency, Recency(now.timestamp_millis()));
    }

    #[test]
    fn test_reconcile_keeps_fresher_local_state() {
        let (mut tracker, _remote) = tracker(AppConfig::default());
        tracker.track(URL, "Local title", "document", "abc", at(10));

        let older = DocumentRecord { title: "Remote title".into(), ..record("abc", at(0).timestamp_millis()) };
        let report = tracker.reconcile(BTreeMap::from([("abc".to_string(), older)]), at(20));

        assert_eq!(report.stale, 1);
        assert_eq!(tracker.store().get("abc").unwrap().title, "Local title");
    }

    #[test]
    fn test_reconcile_over_capacity_keeps_freshest() {
        let config = AppConfig { max_docs: 3, max_results: 3, ..Default::default() };
        let (mut tracker, _remote) = tracker(config);
        let loaded = [("z", 50), ("a", 10), ("m", 40), ("b", 20), ("c", 30)]
            .into_iter()
            .map(|(id, r)| (id.to_string(), record(id, r)))
            .collect();

        tracker.reconcile(loaded, at(0));

        assert_eq!(tracker.store().recent_ids(), vec!["z", "m", "c"]);
    }

    #[test]
    fn test_first_live_touch_after_reconcile_persists() {
        let (mut tracker, remote) = tracker(AppConfig::default());
        tracker.reconcile(BTreeMap::from([("abc".to_string(), record("abc", 1))]), at(0));

        tracker.track(URL, "Doc abc", "document", "abc", at(1));
        assert_eq!(remote.writes(), 1);
    }

    #[test]
    fn test_counter_strategy() {
        let config = AppConfig { recency: RecencyStrategy::Counter, ..Default::default() };
        let (mut tracker, _remote) = tracker(config);
        tracker.reconcile(BTreeMap::from([("old".to_string(), record("old", 7))]), at(0));

        let outcome = tracker.track(URL, "Notes", "document", "abc", at(0));
        assert_eq!(outcome.record.recency, Recency(8));
        assert_eq!(tracker.store().recent_ids(), vec!["abc", "old"]);
    }

    #[test]
    fn test_eviction_through_tracker() {
        let config = AppConfig { max_docs: 2, max_results: 2, ..Default::default() };
        let (mut tracker, _remote) = tracker(config);
        tracker.track(URL, "One", "document", "one", at(0));
        tracker.track(URL, "Two", "document", "two", at(1));
        let outcome = tracker.track(URL, "Three", "document", "three", at(2));

        assert_eq!(outcome.evicted().unwrap().id, "one");
        assert_eq!(tracker.search("", 10).len(), 2);
    }

    #[tokio::test]
    async fn test_counter_track_after_max_loaded_recency() {
        let config = AppConfig { recency: RecencyStrategy::Counter, ..Default::default() };
        let (mut tracker, remote) = tracker(config);
        remote.insert_raw("big", json!({ "id": "big", "title": "Big", "recency": i64::MAX }));
        remote.insert_raw("huge", json!({ "id": "huge", "title": "Huge", "recency": 1e300 }));

        tracker.load_and_reconcile(at(0)).await;
        let outcome = tracker.track(URL, "Notes", "document", "abc", at(0));

        assert_eq!(outcome.record.recency, Recency(i64::MAX));
        assert!(!outcome.is_stale());
        assert_eq!(tracker.store().len(), 3);
    }

    #[test]
    fn test_counter_reconcile_keeps_live_observation() {
        let config = AppConfig { recency: RecencyStrategy::Counter, ..Default::default() };
        let (mut tracker, remote) = tracker(config);
        tracker.track(URL, "Renamed just now", "document", "abc", at(0));

        let previous = DocumentRecord { title: "Old title from last session".into(), ..record("abc", 40) };
        let loaded = BTreeMap::from([("abc".to_string(), previous), ("old".to_string(), record("old", 39))]);
        let report = tracker.reconcile(loaded, at(1));

        assert_eq!(report.stale, 1);
        assert_eq!(report.applied, 1);
        assert_eq!(tracker.store().get("abc").unwrap().title, "Renamed just now");
        assert_eq!(remote.writes(), 1);

        // Later live stamps still outrank everything loaded.
        let outcome = tracker.track(URL, "Fresh", "document", "new", at(2));
        assert_eq!(outcome.record.recency, Recency(41));
        assert_eq!(tracker.store().recent_ids()[0], "new");
    }

    #[tokio::test]
    async fn test_load_remote_without_tracker() {
        let remote = MemoryStore::new();
        remote.insert_raw("a", json!({ "id": "a", "title": "A", "recency": 3 }));

        let loaded = DocTracker::load_remote(&remote).await;
        assert_eq!(loaded["a"].recency, Recency(3));
    }
}
