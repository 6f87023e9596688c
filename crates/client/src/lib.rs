//! Host-facing adapters for doc-history.
//!
//! This crate connects browser collaborators to the core tracker:
//! tab observation feeds documents in, and the omnibox module answers
//! keyword queries and resolves navigations.

pub mod omnibox;
pub mod tabs;

pub use omnibox::{Disposition, Navigation, NavigationSink, Suggestion, escape_markup, navigate, suggest};
pub use tabs::{DocRef, DocUrlError, ReportedTabs, TabChange, TabEvent, TabInfo, TabSource, observe_tab, on_tab_updated, track_open_tabs};
