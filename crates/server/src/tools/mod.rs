//! MCP tool implementations.
//!
//! This module contains all tools exposed by the doc-history server.

pub mod omnibox;
pub mod recent;
pub mod tabs;

pub use omnibox::{EnterParams, SuggestParams};
pub use recent::RecentParams;
pub use tabs::TabsOpenedParams;

use dochist_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

/// Serialize a tool output as pretty JSON text content.
fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(Error::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use dochist_core::{AppConfig, DocTracker, MemoryStore};
    use rmcp::model::CallToolResult;
    use serde::de::DeserializeOwned;
    use tokio::sync::Mutex;

    pub(crate) fn tracker() -> (Mutex<DocTracker>, Arc<MemoryStore>) {
        let remote = Arc::new(MemoryStore::new());
        (Mutex::new(DocTracker::new(&AppConfig::default(), remote.clone())), remote)
    }

    pub(crate) fn output_of<T: DeserializeOwned>(result: &CallToolResult) -> T {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }
}
