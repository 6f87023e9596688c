//! Core types and shared functionality for doc-history.
//!
//! This crate provides:
//! - Bounded recency store with least-recently-updated eviction
//! - Token query matching over stored titles
//! - Remote key-value persistence with SQLite backend
//! - Reconciliation between live observations and persisted state
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod persist;
pub mod query;
pub mod store;
pub mod sync;
pub mod title;

pub use config::{AppConfig, RecencyStrategy};
pub use error::Error;
pub use persist::{KvDb, MemoryStore, RemoteStore};
pub use query::{ParsedQuery, TermMatcher};
pub use store::{Change, DocumentRecord, DocumentUpdate, Recency, RecencySource, RecencyStore, UpsertOutcome};
pub use sync::{DocTracker, ReconcileReport};
pub use title::strip_title;
