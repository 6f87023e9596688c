//! doc-history server entry point.
//!
//! Boots the MCP server on stdio transport after restoring tracked documents
//! from the key-value database. Logging goes to stderr to avoid interfering
//! with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use dochist_core::{AppConfig, DocTracker, KvDb, ReconcileReport};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(db_path = %config.db_path.display(), max_docs = config.max_docs, "Starting doc-history server on stdio transport");

    let db = KvDb::open(&config.db_path).await?;
    let purged = db.purge_lru(config.max_docs).await?;
    if purged > 0 {
        tracing::info!(purged, "pruned stored documents beyond capacity");
    }

    let tracker = Arc::new(Mutex::new(DocTracker::new(&config, Arc::new(db))));
    let restoring = Arc::clone(&tracker);
    tokio::spawn(async move {
        restore(&restoring).await;
    });

    let handler = handler::DocHistoryServer::new(tracker, config.max_results, config.host_glob);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}

/// Load persisted documents and merge them into the tracker once.
///
/// The load runs outside the lock; until it lands, tools see only live
/// observations.
async fn restore(tracker: &Mutex<DocTracker>) -> ReconcileReport {
    let remote = tracker.lock().await.remote();
    let loaded = DocTracker::load_remote(remote.as_ref()).await;
    tracker.lock().await.reconcile(loaded, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dochist_core::{MemoryStore, RecencyStrategy};
    use serde_json::json;

    #[tokio::test]
    async fn test_restore_merges_without_writing() {
        let remote = Arc::new(MemoryStore::new());
        remote.insert_raw("a", json!({ "id": "a", "title": "A", "type": "document", "recency": 1 }));
        remote.insert_raw("b", json!({ "id": "b", "title": "B", "type": "document", "recency": 2 }));
        let tracker = Mutex::new(DocTracker::new(&AppConfig::default(), remote.clone()));

        let report = restore(&tracker).await;

        assert_eq!(report.applied, 2);
        assert_eq!(tracker.lock().await.store().recent_ids(), vec!["b", "a"]);
        assert_eq!(remote.writes(), 0);
    }

    #[tokio::test]
    async fn test_restore_after_live_counter_observation() {
        let config = AppConfig { recency: RecencyStrategy::Counter, ..Default::default() };
        let remote = Arc::new(MemoryStore::new());
        remote.insert_raw("abc", json!({ "id": "abc", "title": "Old", "recency": 40 }));
        let tracker = Mutex::new(DocTracker::new(&config, remote.clone()));
        let url = "https://docs.google.com/document/d/abc/edit";
        tracker.lock().await.track(url, "New", "document", "abc", Utc::now());

        restore(&tracker).await;

        assert_eq!(tracker.lock().await.store().get("abc").unwrap().title, "New");
    }
}
