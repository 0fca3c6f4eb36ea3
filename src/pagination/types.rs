//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.

use super::strategies::{CursorPaginator, NoPaginator, OffsetPaginator, PageNumberPaginator};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Position of the next page to request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// Opaque token returned by the API
    Token(String),
    /// Item offset
    Offset(u64),
    /// Page number
    Page(u64),
}

impl Cursor {
    /// The cursor as a template value (string token or number)
    pub fn to_value(&self) -> Value {
        match self {
            Cursor::Token(token) => Value::String(token.clone()),
            Cursor::Offset(n) | Cursor::Page(n) => Value::from(*n),
        }
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cursor::Token(token) => write!(f, "token {token}"),
            Cursor::Offset(n) => write!(f, "offset {n}"),
            Cursor::Page(n) => write!(f, "page {n}"),
        }
    }
}

/// Why paging stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Response carried no next cursor
    NoCursor,
    /// Next cursor equals the one just used
    RepeatedCursor,
    /// Page came back empty
    EmptyPage,
    /// Page had fewer items than requested
    ShortPage,
    /// Reported total count / total pages reached
    TotalReached,
    /// Endpoint is not paginated
    SinglePage,
    /// Configured page limit reached
    MaxPages,
    /// Configured item limit reached
    MaxItems,
}

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// More pages available at this cursor
    Continue(Cursor),
    /// No more pages
    Done(StopReason),
}

impl NextPage {
    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

/// Core trait for pagination strategies
pub trait Paginator: Send + Sync + std::fmt::Debug {
    /// Cursor for the first request
    fn initial_cursor(&self) -> Option<Cursor>;

    /// Inspect a response and decide the next cursor.
    ///
    /// `page_items` is the number of items extracted from `body`,
    /// `current` the cursor used to request it.
    fn next_page(
        &self,
        body: &Value,
        page_items: usize,
        page_size: u32,
        current: Option<&Cursor>,
    ) -> Result<NextPage>;
}

/// Configuration for pagination behavior
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaginationConfig {
    /// No pagination
    #[default]
    None,

    /// Token cursor read from each response
    Cursor {
        /// Path to the next cursor in the response
        path: String,
        /// Also stop on a page with no items
        #[serde(default)]
        stop_on_empty_page: bool,
    },

    /// Offset-based pagination
    Offset {
        /// First offset
        #[serde(default)]
        start: u64,
        /// Optional path to the total item count
        #[serde(default)]
        total_path: Option<String>,
    },

    /// Page number pagination
    PageNumber {
        /// First page number (usually 0 or 1)
        #[serde(default = "default_start_page")]
        start: u64,
        /// Optional path to the total page count
        #[serde(default)]
        total_pages_path: Option<String>,
    },
}

fn default_start_page() -> u64 {
    1
}

impl PaginationConfig {
    /// Create cursor pagination config
    pub fn cursor(path: impl Into<String>) -> Self {
        Self::Cursor {
            path: path.into(),
            stop_on_empty_page: false,
        }
    }

    /// Create offset pagination config
    pub fn offset(start: u64) -> Self {
        Self::Offset {
            start,
            total_path: None,
        }
    }

    /// Create page number pagination config
    pub fn page_number(start: u64) -> Self {
        Self::PageNumber {
            start,
            total_pages_path: None,
        }
    }

    /// Build the strategy for this config
    pub fn build(&self) -> Box<dyn Paginator> {
        match self {
            Self::None => Box::new(NoPaginator),
            Self::Cursor {
                path,
                stop_on_empty_page,
            } => Box::new(CursorPaginator::new(path).with_stop_on_empty_page(*stop_on_empty_page)),
            Self::Offset { start, total_path } => {
                Box::new(OffsetPaginator::new(*start).with_total_path(total_path.clone()))
            }
            Self::PageNumber {
                start,
                total_pages_path,
            } => Box::new(
                PageNumberPaginator::new(*start).with_total_pages_path(total_pages_path.clone()),
            ),
        }
    }

    /// Paths this config reads from responses (for validation)
    pub fn paths(&self) -> Vec<&str> {
        match self {
            Self::None => vec![],
            Self::Cursor { path, .. } => vec![path.as_str()],
            Self::Offset { total_path, .. } => total_path.iter().map(String::as_str).collect(),
            Self::PageNumber {
                total_pages_path, ..
            } => total_pages_path.iter().map(String::as_str).collect(),
        }
    }
}
