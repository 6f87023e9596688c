//! Recency sources: wall clock or logical counter.

use chrono::{DateTime, Utc};

use super::Recency;
use crate::config::RecencyStrategy;

/// Produces recency stamps for live observations and admits loaded ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecencySource {
    /// Epoch milliseconds of the observation time.
    Clock,
    /// Monotonic counter; `last` is the most recently issued value.
    Counter { last: i64 },
}

impl RecencySource {
    pub fn from_strategy(strategy: RecencyStrategy) -> Self {
        match strategy {
            RecencyStrategy::Clock => Self::Clock,
            RecencyStrategy::Counter => Self::Counter { last: 0 },
        }
    }

    /// Stamp a live observation made at `now`.
    pub fn stamp(&mut self, now: DateTime<Utc>) -> Recency {
        match self {
            Self::Clock => Recency(now.timestamp_millis()),
            Self::Counter { last } => {
                *last = last.saturating_add(1);
                Recency(*last)
            }
        }
    }

    /// True when stamps are only ordered within one process lifetime.
    pub fn is_session_local(&self) -> bool {
        matches!(self, Self::Counter { .. })
    }

    /// Admit a recency loaded from the remote store.
    ///
    /// Clock values in the future are clamped to `now`. Counter values are
    /// kept, and the counter moves past them so later stamps rank higher.
    pub fn admit(&mut self, loaded: Recency, now: DateTime<Utc>) -> Recency {
        match self {
            Self::Clock => loaded.min(Recency(now.timestamp_millis())),
            Self::Counter { last } => {
                *last = (*last).max(loaded.0);
                loaded
            }
        }
    }
}
