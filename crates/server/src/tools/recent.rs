//! docs_recent tool implementation.
//!
//! Lists tracked documents, freshest first.

use dochist_core::{DocTracker, DocumentRecord, Error};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::json_result;

/// Parameters for the docs_recent tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RecentParams {
    /// Maximum documents to return (default: all). Must be at least 1.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Output from the docs_recent tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecentOutput {
    /// Number of tracked documents.
    pub total: usize,
    pub documents: Vec<DocumentRecord>,
}

/// Implementation of the docs_recent tool.
pub async fn recent_impl(tracker: &Mutex<DocTracker>, params: RecentParams) -> Result<CallToolResult, McpError> {
    if params.limit == Some(0) {
        return Err(Error::InvalidInput("limit must be greater than 0".to_string()).into());
    }

    let guard = tracker.lock().await;
    let store = guard.store();
    let limit = params.limit.unwrap_or(store.len());

    let documents = store.records().into_iter().take(limit).cloned().collect();
    json_result(&RecentOutput { total: store.len(), documents })
}
