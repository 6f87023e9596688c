//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::{
    EnterParams, RecentParams, SuggestParams, TabsOpenedParams,
    omnibox::{enter_impl, suggest_impl},
    recent::recent_impl,
    tabs::{tab_updated_impl, tabs_opened_impl},
};
use dochist_client::TabEvent;
use dochist_core::DocTracker;
use tokio::sync::Mutex;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for doc-history.
///
/// Every tool locks the shared tracker for its whole run, so handlers
/// execute one at a time against the store.
#[derive(Clone)]
pub struct DocHistoryServer {
    tool_router: ToolRouter<Self>,
    tracker: Arc<Mutex<DocTracker>>,
    max_results: usize,
    host_glob: String,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl DocHistoryServer {
    /// Create a new server handler around a shared tracker.
    pub fn new(tracker: Arc<Mutex<DocTracker>>, max_results: usize, host_glob: impl Into<String>) -> Self {
        Self { tool_router: Self::tool_router(), tracker, max_results, host_glob: host_glob.into() }
    }

    /// Record a browser tab update.
    #[tool(description = "Report a browser tab update. Tracks the tab when it finished loading or changed title and its URL is a hosted document.")]
    async fn tab_updated(&self, params: Parameters<TabEvent>) -> Result<CallToolResult, McpError> {
        tab_updated_impl(&self.tracker, params.0).await
    }

    /// Ingest the tabs open at startup.
    #[tool(description = "Report the tabs open at startup. Every hosted-document tab matching the server's URL glob is tracked.")]
    async fn tabs_opened(&self, params: Parameters<TabsOpenedParams>) -> Result<CallToolResult, McpError> {
        tabs_opened_impl(&self.tracker, params.0, &self.host_glob).await
    }

    /// Suggestions for typed keyword text.
    #[tool(description = "Suggest recently viewed documents whose titles match every word of the text, freshest first.")]
    async fn omnibox_suggest(&self, params: Parameters<SuggestParams>) -> Result<CallToolResult, McpError> {
        suggest_impl(&self.tracker, params.0, self.max_results).await
    }

    /// Resolve accepted keyword text to a navigation.
    #[tool(description = "Resolve accepted text to the freshest matching document and return the navigation to perform.")]
    async fn omnibox_enter(&self, params: Parameters<EnterParams>) -> Result<CallToolResult, McpError> {
        enter_impl(&self.tracker, params.0).await
    }

    /// List tracked documents.
    #[tool(description = "List tracked documents, most recently viewed first.")]
    async fn docs_recent(&self, params: Parameters<RecentParams>) -> Result<CallToolResult, McpError> {
        recent_impl(&self.tracker, params.0).await
    }
}

impl ServerHandler for DocHistoryServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "doc-history".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(format!(
                "At startup, call tabs_opened with the open tabs whose URL matches {}. Then report every tab update with tab_updated.",
                self.host_glob
            )),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dochist_core::{AppConfig, MemoryStore};

    fn server(config: &AppConfig) -> DocHistoryServer {
        let tracker = DocTracker::new(config, Arc::new(MemoryStore::new()));
        DocHistoryServer::new(Arc::new(Mutex::new(tracker)), config.max_results, config.host_glob.clone())
    }

    #[test]
    fn test_lists_all_tools() {
        let server = server(&AppConfig::default());

        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(names, vec!["docs_recent", "omnibox_enter", "omnibox_suggest", "tab_updated", "tabs_opened"]);
    }

    #[test]
    fn test_info_advertises_host_glob() {
        let config = AppConfig { host_glob: "*://docs.example.test/*".into(), ..Default::default() };
        let info = server(&config).get_info();

        assert!(info.instructions.unwrap().contains("*://docs.example.test/*"));
    }
}
