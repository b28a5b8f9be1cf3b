//! Error Taxonomy
//!
//! Every failure that crosses the service boundary is one of three kinds, so callers
//! can branch on it (retry a `Timeout`, never retry an `InvalidQuery`).
//!
//! A degraded fan-out is *not* an error: it is reported through
//! `RoutedResults::partial` when the router runs with the lenient policy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    /// Empty positive set, non-positive limit, or a rejected same-axis contradiction.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    /// The posting store (or one shard of it) could not be reached.
    #[error("index unavailable ({shard}): {reason}")]
    IndexUnavailable { shard: String, reason: String },
    /// The caller-supplied deadline expired while posting lists were being read.
    #[error("deadline of {deadline_ms} ms exceeded")]
    Timeout { deadline_ms: u64 },
}

pub type SearchResult<T> = Result<T, SearchError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidQuery,
    IndexUnavailable,
    Timeout,
}

impl SearchError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidQuery(message.into())
    }

    pub fn unavailable(shard: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::IndexUnavailable {
            shard: shard.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SearchError::InvalidQuery(_) => ErrorKind::InvalidQuery,
            SearchError::IndexUnavailable { .. } => ErrorKind::IndexUnavailable,
            SearchError::Timeout { .. } => ErrorKind::Timeout,
        }
    }

    /// Storage-side failures may succeed on retry; malformed queries never will.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SearchError::InvalidQuery(_))
    }
}

/// Structured error payload handed to whatever transport wraps the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&SearchError> for ErrorBody {
    fn from(error: &SearchError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}
