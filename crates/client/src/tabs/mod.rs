//! Browser tab observation.
//!
//! Tab events and startup enumerations are filtered down to document URLs
//! and handed to the [`DocTracker`] as live observations.

pub mod url;

pub use self::url::{DOCS_HOST, DocRef, DocUrlError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dochist_core::{DocTracker, UpsertOutcome};
use globset::Glob;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Status value reported when a tab finishes loading.
pub const STATUS_COMPLETE: &str = "complete";

/// Changed properties reported with a tab update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TabChange {
    /// Loading status, e.g. "loading" or "complete".
    #[serde(default)]
    pub status: Option<String>,
    /// New title, when the title changed.
    #[serde(default)]
    pub title: Option<String>,
}

impl TabChange {
    /// True when the tab finished loading or its title changed.
    pub fn is_trackable(&self) -> bool {
        self.status.as_deref() == Some(STATUS_COMPLETE) || self.title.is_some()
    }
}

/// Current state of a tab.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TabInfo {
    pub url: String,
    #[serde(default)]
    pub title: String,
}

/// A tab update notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TabEvent {
    pub tab_id: i64,
    #[serde(default)]
    pub change_info: TabChange,
    pub tab: TabInfo,
}

/// Enumerates open tabs at startup.
#[async_trait]
pub trait TabSource: Send + Sync {
    /// All open tabs whose URL matches `url_glob`.
    async fn query(&self, url_glob: &str) -> Vec<TabInfo>;
}

/// Tabs already enumerated by the host, filtered by URL glob on query.
#[derive(Debug, Clone, Default)]
pub struct ReportedTabs(pub Vec<TabInfo>);

#[async_trait]
impl TabSource for ReportedTabs {
    async fn query(&self, url_glob: &str) -> Vec<TabInfo> {
        let matcher = match Glob::new(url_glob) {
            Ok(glob) => glob.compile_matcher(),
            Err(e) => {
                tracing::warn!(url_glob, error = %e, "invalid tab glob, keeping every reported tab");
                return self.0.clone();
            }
        };
        self.0.iter().filter(|tab| matcher.is_match(&tab.url)).cloned().collect()
    }
}

/// Track a tab if its URL is a document; other tabs are ignored.
pub fn observe_tab(tracker: &mut DocTracker, tab: &TabInfo, now: DateTime<Utc>) -> Option<UpsertOutcome> {
    match DocRef::parse(&tab.url) {
        Ok(doc) => {
            tracing::info!(url = %tab.url, title = %tab.title, "found doc");
            Some(tracker.track(&tab.url, &tab.title, &doc.kind, &doc.id, now))
        }
        Err(e) => {
            tracing::debug!(url = %tab.url, error = %e, "ignoring tab");
            None
        }
    }
}

/// Handle a tab update notification.
pub fn on_tab_updated(tracker: &mut DocTracker, event: &TabEvent, now: DateTime<Utc>) -> Option<UpsertOutcome> {
    if !event.change_info.is_trackable() {
        return None;
    }
    observe_tab(tracker, &event.tab, now)
}

/// Track every document among `tabs`. Returns how many were tracked.
pub fn observe_tabs(tracker: &mut DocTracker, tabs: &[TabInfo], now: DateTime<Utc>) -> usize {
    tabs.iter()
        .filter_map(|tab| observe_tab(tracker, tab, now))
        .count()
}

/// Enumerate open tabs from `source` and track the documents among them.
pub async fn track_open_tabs(
    tracker: &mut DocTracker, source: &dyn TabSource, url_glob: &str, now: DateTime<Utc>,
) -> usize {
    let tabs = source.query(url_glob).await;
    observe_tabs(tracker, &tabs, now)
}
