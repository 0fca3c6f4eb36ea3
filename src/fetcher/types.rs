//! Fetch outcome types

use crate::error::{Error, Result};
use crate::pagination::StopReason;
use serde::Serialize;
use serde_json::Value;

/// How a fetch ended
#[derive(Debug)]
pub enum FetchStatus {
    /// Paging finished normally (no next cursor, or a configured limit)
    Complete,
    /// A fatal error after at least one page; the items gathered so far
    /// are kept
    Partial(Error),
    /// A fatal error before any page was received
    Failed(Error),
}

impl FetchStatus {
    /// Short label for logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Partial(_) => "partial",
            Self::Failed(_) => "failed",
        }
    }

    /// The error that ended the fetch, if any
    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Complete => None,
            Self::Partial(e) | Self::Failed(e) => Some(e),
        }
    }
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.error() {
            Some(e) => write!(f, "{} ({e})", self.as_str()),
            None => f.write_str(self.as_str()),
        }
    }
}

/// Statistics from one fetch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FetchStats {
    /// Pages received and parsed
    pub pages: u32,
    /// Items returned
    pub items: usize,
    /// Why paging stopped (unset when an error ended it)
    pub stop_reason: Option<StopReason>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

/// Items gathered by a fetch together with how it ended
#[derive(Debug)]
pub struct FetchOutcome {
    /// Result items in the order the API returned them
    pub items: Vec<Value>,
    /// Completion status
    pub status: FetchStatus,
    /// Statistics
    pub stats: FetchStats,
}

impl FetchOutcome {
    /// Check if every page was fetched
    pub fn is_complete(&self) -> bool {
        matches!(self.status, FetchStatus::Complete)
    }

    /// Check if the items are a partial result
    pub fn is_partial(&self) -> bool {
        matches!(self.status, FetchStatus::Partial(_))
    }

    /// The error that ended the fetch, if any
    pub fn error(&self) -> Option<&Error> {
        self.status.error()
    }

    /// The items of a complete fetch, or the error that cut it short
    pub fn into_result(self) -> Result<Vec<Value>> {
        match self.status {
            FetchStatus::Complete => Ok(self.items),
            FetchStatus::Partial(e) | FetchStatus::Failed(e) => Err(e),
        }
    }
}
