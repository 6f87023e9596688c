//! tab_updated and tabs_opened tool implementations.
//!
//! Feed browser tab observations into the tracker.

use chrono::Utc;
use dochist_client::tabs::{ReportedTabs, TabEvent, TabInfo, on_tab_updated, track_open_tabs};
use dochist_core::{DocTracker, DocumentRecord};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::json_result;

/// Output from the tab_updated tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TabUpdatedOutput {
    /// Whether the tab was recognized as a document and tracked.
    pub tracked: bool,
    /// The stored record after the update.
    pub record: Option<DocumentRecord>,
}

/// Parameters for the tabs_opened tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TabsOpenedParams {
    /// Tabs open at startup, as enumerated by the host. Only tabs matching
    /// the configured URL glob are considered.
    pub tabs: Vec<TabInfo>,
}

/// Output from the tabs_opened tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TabsOpenedOutput {
    /// Number of tabs recognized as documents.
    pub tracked: usize,
    /// URL glob the reported tabs were filtered with.
    pub url_glob: String,
}

/// Implementation of the tab_updated tool.
pub async fn tab_updated_impl(tracker: &Mutex<DocTracker>, event: TabEvent) -> Result<CallToolResult, McpError> {
    let outcome = on_tab_updated(&mut *tracker.lock().await, &event, Utc::now());

    let output = TabUpdatedOutput { tracked: outcome.is_some(), record: outcome.map(|o| o.record) };
    json_result(&output)
}

/// Implementation of the tabs_opened tool.
pub async fn tabs_opened_impl(
    tracker: &Mutex<DocTracker>, params: TabsOpenedParams, url_glob: &str,
) -> Result<CallToolResult, McpError> {
    let reported = params.tabs.len();
    let source = ReportedTabs(params.tabs);
    let tracked = track_open_tabs(&mut *tracker.lock().await, &source, url_glob, Utc::now()).await;
    tracing::info!(tabs = reported, tracked, url_glob, "ingested open tabs");

    json_result(&TabsOpenedOutput { tracked, url_glob: url_glob.to_string() })
}
