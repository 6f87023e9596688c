//! Address-bar keyword integration.
//!
//! Provides the suggestion list shown while the user types and the
//! navigation performed when they accept a query.

mod markup;

pub use markup::escape_markup;

use dochist_core::RecencyStore;
use dochist_core::query::search;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One suggestion row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Suggestion {
    /// Text placed in the address bar when the row is picked (the title).
    pub content: String,
    /// Escaped markup: title followed by `<url>…</url>`.
    pub description: String,
}

/// Where the user asked to open the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Disposition {
    #[default]
    CurrentTab,
    NewForegroundTab,
    NewBackgroundTab,
}

/// Navigation performed for an accepted query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Navigation {
    /// Load the url in the current tab.
    UpdateCurrentTab { url: String },
    /// Open the url in a new tab; `active` selects foreground.
    CreateTab { url: String, active: bool },
}

impl Navigation {
    fn resolve(url: &str, disposition: Disposition) -> Self {
        let url = url.to_string();
        match disposition {
            Disposition::CurrentTab => Self::UpdateCurrentTab { url },
            Disposition::NewForegroundTab => Self::CreateTab { url, active: true },
            Disposition::NewBackgroundTab => Self::CreateTab { url, active: false },
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::UpdateCurrentTab { url } | Self::CreateTab { url, .. } => url,
        }
    }

    /// Perform this navigation on `sink`.
    pub fn dispatch(&self, sink: &mut dyn NavigationSink) {
        match self {
            Self::UpdateCurrentTab { url } => sink.update_current_tab(url),
            Self::CreateTab { url, active } => sink.create_tab(url, *active),
        }
    }
}

/// Host capability to open urls.
pub trait NavigationSink {
    fn update_current_tab(&mut self, url: &str);
    fn create_tab(&mut self, url: &str, foreground: bool);
}

/// Collects navigations instead of performing them.
impl NavigationSink for Vec<Navigation> {
    fn update_current_tab(&mut self, url: &str) {
        self.push(Navigation::UpdateCurrentTab { url: url.to_string() });
    }

    fn create_tab(&mut self, url: &str, foreground: bool) {
        self.push(Navigation::CreateTab { url: url.to_string(), active: foreground });
    }
}

/// Suggestions for `text`, freshest first, at most `limit` of them.
///
/// Only the first row is shown plain; later titles are wrapped in `<dim>`.
pub fn suggest(store: &RecencyStore, text: &str, limit: usize) -> Vec<Suggestion> {
    search(store, text, limit)
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let title = escape_markup(&record.title);
            let title = if index > 0 { format!("<dim>{title}</dim>") } else { title };
            Suggestion {
                content: record.title.clone(),
                description: format!("{title} <url>{}</url>", escape_markup(&record.url)),
            }
        })
        .collect()
}

/// Open the freshest document matching `text`.
///
/// Returns the navigation performed, or None when nothing matched.
pub fn navigate(
    store: &RecencyStore, text: &str, disposition: Disposition, sink: &mut dyn NavigationSink,
) -> Option<Navigation> {
    let Some(target) = search(store, text, 1).into_iter().next() else {
        tracing::info!(query = text, "No match for query");
        return None;
    };

    let navigation = Navigation::resolve(&target.url, disposition);
    navigation.dispatch(sink);
    Some(navigation)
}
