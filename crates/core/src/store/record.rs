//! Document records and their lenient decoding from persisted values.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Relative freshness of a record.
///
/// Either wall-clock milliseconds or a logical counter, depending on the
/// configured [`RecencySource`](super::RecencySource). Comparable across all
/// records of one store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Recency(pub i64);

impl Recency {
    pub fn value(self) -> i64 {
        self.0
    }
}

/// Tracked metadata for one observed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DocumentRecord {
    /// Stable document identifier taken from the URL.
    pub id: String,
    pub url: String,
    /// Display title with the product suffix already stripped.
    pub title: String,
    /// Document kind from the URL (e.g. "document", "spreadsheets").
    #[serde(rename = "type")]
    pub kind: String,
    pub recency: Recency,
}

/// A write request for [`RecencyStore::upsert`](super::RecencyStore::upsert).
#[derive(Debug, Clone)]
pub struct DocumentUpdate {
    pub id: String,
    pub url: String,
    pub title: String,
    pub kind: String,
    pub recency: Recency,
    /// True for live observations that may propagate to the remote store.
    /// Reconciliation loads pass false.
    pub authoritative: bool,
}

impl DocumentUpdate {
    pub(crate) fn into_record(self) -> DocumentRecord {
        DocumentRecord { id: self.id, url: self.url, title: self.title, kind: self.kind, recency: self.recency }
    }
}

impl DocumentRecord {
    /// Decode a persisted value without rejecting it.
    ///
    /// Missing or mistyped text fields become empty strings and a missing or
    /// unparseable recency becomes 0. The storage key stands in for a missing id.
    pub fn from_stored(key: &str, value: &Value) -> Self {
        let text = |field: &str| value.get(field).and_then(Value::as_str).map(str::to_string);

        Self {
            id: text("id").filter(|id| !id.is_empty()).unwrap_or_else(|| key.to_string()),
            url: text("url").unwrap_or_default(),
            title: text("title").unwrap_or_default(),
            kind: text("type").unwrap_or_default(),
            recency: Recency(value.get("recency").and_then(lenient_i64).unwrap_or(0)),
        }
    }

    /// Convert to an update for the store, keeping every field.
    pub fn into_update(self, authoritative: bool) -> DocumentUpdate {
        DocumentUpdate {
            id: self.id,
            url: self.url,
            title: self.title,
            kind: self.kind,
            recency: self.recency,
            authoritative,
        }
    }
}

fn lenient_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok().or_else(|| s.trim().parse::<f64>().ok().map(|f| f as i64)),
        _ => None,
    }
}
