//! Recognition of hosted-document URLs.
//!
//! A document URL has the shape `https://docs.google.com/<kind>/d/<id>/...`
//! where `<kind>` is lowercase ASCII letters and at least one path segment
//! follows the id.

/// Host serving tracked documents.
pub const DOCS_HOST: &str = "docs.google.com";

/// Error type for URLs that are not tracked documents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocUrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    Invalid(String),

    #[error("not a document URL")]
    NotADocument,
}

/// Kind and id extracted from a document URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocRef {
    /// Document kind, e.g. "document", "spreadsheets", "presentation".
    pub kind: String,
    /// Stable document id; the store key.
    pub id: String,
}

impl DocRef {
    /// Extract kind and id from a tab URL.
    pub fn parse(input: &str) -> Result<Self, DocUrlError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DocUrlError::Empty);
        }

        let parsed = url::Url::parse(trimmed).map_err(|e| DocUrlError::Invalid(e.to_string()))?;

        if parsed.scheme() != "https" {
            return Err(DocUrlError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        if parsed.host_str() != Some(DOCS_HOST) || parsed.port().is_some() || !parsed.username().is_empty() {
            return Err(DocUrlError::NotADocument);
        }

        let mut segments = parsed.path_segments().ok_or(DocUrlError::NotADocument)?;
        match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(kind), Some("d"), Some(id), Some(_)) if is_kind(kind) && !id.is_empty() => {
                Ok(Self { kind: kind.to_string(), id: id.to_string() })
            }
            _ => Err(DocUrlError::NotADocument),
        }
    }
}

fn is_kind(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_lowercase())
}
