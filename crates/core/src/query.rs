//! Free-text query matching against document titles.
//!
//! A query is lowercased and split on whitespace. Each term must occur in
//! the lowercased title at a word start: index 0, or right after a
//! character that is not alphanumeric or `_`. A term therefore matches
//! any word it prefixes ("plan" matches "planning") but never the middle
//! of a word ("lanning" does not). All terms must match; an empty query
//! matches every title.

use crate::store::{DocumentRecord, RecencyStore};

/// Default number of search results.
pub const MAX_RESULTS: usize = 5;

/// Tests one lowercase term for a word-start occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermMatcher {
    term: String,
}

impl TermMatcher {
    pub fn new(term: impl Into<String>) -> Self {
        Self { term: term.into().to_lowercase() }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// True if the term begins a word somewhere in `target`.
    ///
    /// `target` is expected to be lowercased already.
    pub fn is_match(&self, target: &str) -> bool {
        target
            .match_indices(self.term.as_str())
            .any(|(idx, _)| is_word_start(target, idx))
    }
}

fn is_word_start(text: &str, idx: usize) -> bool {
    text[..idx]
        .chars()
        .next_back()
        .is_none_or(|prev| !(prev.is_alphanumeric() || prev == '_'))
}

/// A tokenized query: one matcher per whitespace-separated term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    terms: Vec<TermMatcher>,
}

impl ParsedQuery {
    /// Lowercase `text`, split on whitespace runs and drop empty tokens.
    pub fn parse(text: &str) -> Self {
        let terms = text.to_lowercase().split_whitespace().map(TermMatcher::new).collect();
        Self { terms }
    }

    pub fn terms(&self) -> &[TermMatcher] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// True if every term matches the record's title.
    pub fn matches(&self, record: &DocumentRecord) -> bool {
        let title = record.title.to_lowercase();
        self.terms.iter().all(|term| term.is_match(&title))
    }
}

/// Tokenize a query into term matchers.
pub fn parse_query(text: &str) -> ParsedQuery {
    ParsedQuery::parse(text)
}

/// True if every term of `query` matches the record's title.
pub fn matches(record: &DocumentRecord, query: &ParsedQuery) -> bool {
    query.matches(record)
}

/// Matching records, freshest first, at most `limit` of them.
///
/// Results keep the store's recency order; matching does not re-rank.
pub fn search<'a>(store: &'a RecencyStore, text: &str, limit: usize) -> Vec<&'a DocumentRecord> {
    let query = ParsedQuery::parse(text);
    store
        .records()
        .into_iter()
        .filter(|record| query.matches(record))
        .take(limit)
        .collect()
}
