//! omnibox_suggest and omnibox_enter tool implementations.

use dochist_client::omnibox::{Disposition, Navigation, Suggestion, navigate, suggest};
use dochist_core::DocTracker;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::json_result;

/// Parameters for the omnibox_suggest tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SuggestParams {
    /// Text typed after the keyword.
    #[serde(default)]
    pub text: String,
}

/// Output from the omnibox_suggest tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SuggestOutput {
    pub suggestions: Vec<Suggestion>,
}

/// Parameters for the omnibox_enter tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EnterParams {
    /// Text the user accepted.
    #[serde(default)]
    pub text: String,

    /// "currentTab" (default), "newForegroundTab" or "newBackgroundTab".
    #[serde(default)]
    pub disposition: Disposition,
}

/// Output from the omnibox_enter tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EnterOutput {
    /// Navigation for the host to perform; null when nothing matched.
    pub navigation: Option<Navigation>,
}

/// Implementation of the omnibox_suggest tool.
pub async fn suggest_impl(
    tracker: &Mutex<DocTracker>, params: SuggestParams, max_results: usize,
) -> Result<CallToolResult, McpError> {
    let suggestions = suggest(tracker.lock().await.store(), &params.text, max_results);
    json_result(&SuggestOutput { suggestions })
}

/// Implementation of the omnibox_enter tool.
pub async fn enter_impl(tracker: &Mutex<DocTracker>, params: EnterParams) -> Result<CallToolResult, McpError> {
    let mut performed: Vec<Navigation> = Vec::new();
    let navigation = navigate(tracker.lock().await.store(), &params.text, params.disposition, &mut performed);
    json_result(&EnterOutput { navigation })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::tests::{output_of, tracker};
    use chrono::Utc;

    async fn seed(tracker: &Mutex<DocTracker>, titles: &[&str]) {
        let mut guard = tracker.lock().await;
        for (i, title) in titles.iter().enumerate() {
            let id = format!("doc{i}");
            let url = format!("https://docs.google.com/document/d/{id}/edit");
            let now = Utc::now() + chrono::Duration::seconds(i as i64);
            guard.track(&url, title, "document", &id, now);
        }
    }

    #[tokio::test]
    async fn test_suggest_limits_results() {
        let (tracker, _remote) = tracker();
        seed(&tracker, &["Plan 1", "Plan 2", "Plan 3", "Plan 4", "Plan 5", "Plan 6", "Plan 7"]).await;

        let params = SuggestParams { text: "plan".into() };
        let output: SuggestOutput = output_of(&suggest_impl(&tracker, params, 5).await.unwrap());

        assert_eq!(output.suggestions.len(), 5);
        assert_eq!(output.suggestions[0].content, "Plan 7");
        assert!(output.suggestions[1].description.starts_with("<dim>Plan 6</dim>"));
    }

    #[tokio::test]
    async fn test_enter_resolves_top_match() {
        let (tracker, _remote) = tracker();
        seed(&tracker, &["Budget Planning", "Budget Review"]).await;

        let params = EnterParams { text: "budget".into(), disposition: Disposition::NewBackgroundTab };
        let output: EnterOutput = output_of(&enter_impl(&tracker, params).await.unwrap());

        assert_eq!(
            output.navigation,
            Some(Navigation::CreateTab { url: "https://docs.google.com/document/d/doc1/edit".into(), active: false })
        );
    }

    #[tokio::test]
    async fn test_enter_no_match() {
        let (tracker, _remote) = tracker();
        seed(&tracker, &["Budget Planning"]).await;

        let params = EnterParams { text: "budget zzz".into(), disposition: Disposition::CurrentTab };
        let output: EnterOutput = output_of(&enter_impl(&tracker, params).await.unwrap());
        assert!(output.navigation.is_none());
    }
}
