//! Remote key-value persistence for tracked documents.
//!
//! The store is a flat bag keyed by document id. Loads happen once at
//! startup; writes are fire-and-forget and never awaited by the caller.
//!
//! - [`KvDb`]: SQLite backend via tokio-rusqlite, with schema migrations
//! - [`MemoryStore`]: in-process map for tests and database-less hosts

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::Error;
use crate::store::DocumentRecord;

pub mod connection;
pub mod documents;
pub mod memory;
pub mod migrations;

pub use connection::KvDb;
pub use memory::MemoryStore;

/// Persistent key-value store for document records.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Load every stored record, keyed by id.
    ///
    /// Malformed fields decode as absent rather than failing the record.
    async fn load_all(&self) -> Result<BTreeMap<String, DocumentRecord>, Error>;

    /// Write records without waiting for completion.
    ///
    /// Failures are logged and dropped.
    fn store(&self, records: BTreeMap<String, DocumentRecord>);
}
