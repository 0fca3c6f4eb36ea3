//! Pagination strategy implementations
//!
//! Each strategy handles a specific pagination pattern.

use super::types::{Cursor, NextPage, Paginator, StopReason};
use crate::error::Result;
use crate::extract::extract_scalar;
use serde_json::Value;
use tracing::warn;

// ============================================================================
// Cursor Pagination
// ============================================================================

/// Cursor-based pagination (GraphQL timelines, `next_cursor` fields)
///
/// The next cursor is read from the response. Paging stops when it is
/// absent, empty, or identical to the cursor just used; the last guard keeps
/// a misbehaving API from looping forever.
#[derive(Debug, Clone)]
pub struct CursorPaginator {
    /// Path to extract cursor from response
    pub cursor_path: String,
    /// Stop on a page with no items
    pub stop_on_empty_page: bool,
}

impl CursorPaginator {
    /// Create a new cursor paginator
    pub fn new(cursor_path: impl Into<String>) -> Self {
        Self {
            cursor_path: cursor_path.into(),
            stop_on_empty_page: false,
        }
    }

    /// Set whether an empty page ends paging
    #[must_use]
    pub fn with_stop_on_empty_page(mut self, stop: bool) -> Self {
        self.stop_on_empty_page = stop;
        self
    }
}

impl Paginator for CursorPaginator {
    fn initial_cursor(&self) -> Option<Cursor> {
        None
    }

    fn next_page(
        &self,
        body: &Value,
        page_items: usize,
        _page_size: u32,
        current: Option<&Cursor>,
    ) -> Result<NextPage> {
        if self.stop_on_empty_page && page_items == 0 {
            return Ok(NextPage::Done(StopReason::EmptyPage));
        }

        let next = match extract_scalar(body, &self.cursor_path)? {
            Some(token) if !token.is_empty() => Cursor::Token(token),
            _ => return Ok(NextPage::Done(StopReason::NoCursor)),
        };

        if current == Some(&next) {
            warn!("API returned the same cursor again ({next}), stopping");
            return Ok(NextPage::Done(StopReason::RepeatedCursor));
        }

        Ok(NextPage::Continue(next))
    }
}

// ============================================================================
// Offset Pagination
// ============================================================================

/// Offset-based pagination
///
/// The offset advances by the number of items received.
/// Common patterns:
/// - `?start=20`
/// - `{"offset": 20, "limit": 10}`
#[derive(Debug, Clone)]
pub struct OffsetPaginator {
    /// First offset
    pub start: u64,
    /// Path to the total item count
    pub total_path: Option<String>,
}

impl OffsetPaginator {
    /// Create a new offset paginator
    pub fn new(start: u64) -> Self {
        Self {
            start,
            total_path: None,
        }
    }

    /// Set the total count path
    #[must_use]
    pub fn with_total_path(mut self, path: Option<String>) -> Self {
        self.total_path = path;
        self
    }
}

impl Paginator for OffsetPaginator {
    fn initial_cursor(&self) -> Option<Cursor> {
        Some(Cursor::Offset(self.start))
    }

    fn next_page(
        &self,
        body: &Value,
        page_items: usize,
        page_size: u32,
        current: Option<&Cursor>,
    ) -> Result<NextPage> {
        if page_items == 0 {
            return Ok(NextPage::Done(StopReason::EmptyPage));
        }

        let offset = match current {
            Some(Cursor::Offset(n)) => *n,
            _ => self.start,
        };
        let next_offset = offset.saturating_add(page_items as u64);

        if let Some(total) = read_count(body, self.total_path.as_deref())? {
            if next_offset >= total {
                return Ok(NextPage::Done(StopReason::TotalReached));
            }
        }

        if page_items < page_size as usize {
            return Ok(NextPage::Done(StopReason::ShortPage));
        }

        Ok(NextPage::Continue(Cursor::Offset(next_offset)))
    }
}

// ============================================================================
// Page Number Pagination
// ============================================================================

/// Page number pagination (e.g., traditional web pagination)
///
/// Common patterns:
/// - `?page=2`
/// - `?page=2&per_page=50`
#[derive(Debug, Clone)]
pub struct PageNumberPaginator {
    /// First page number (usually 0 or 1)
    pub start: u64,
    /// Path to the total page count
    pub total_pages_path: Option<String>,
}

impl PageNumberPaginator {
    /// Create a new page number paginator
    pub fn new(start: u64) -> Self {
        Self {
            start,
            total_pages_path: None,
        }
    }

    /// Set the total pages path
    #[must_use]
    pub fn with_total_pages_path(mut self, path: Option<String>) -> Self {
        self.total_pages_path = path;
        self
    }
}

impl Paginator for PageNumberPaginator {
    fn initial_cursor(&self) -> Option<Cursor> {
        Some(Cursor::Page(self.start))
    }

    fn next_page(
        &self,
        body: &Value,
        page_items: usize,
        page_size: u32,
        current: Option<&Cursor>,
    ) -> Result<NextPage> {
        if page_items == 0 {
            return Ok(NextPage::Done(StopReason::EmptyPage));
        }

        let page = match current {
            Some(Cursor::Page(n)) => *n,
            _ => self.start,
        };

        if let Some(total_pages) = read_count(body, self.total_pages_path.as_deref())? {
            // Pages numbered from `start`, so the last one is start + total - 1
            if page.saturating_add(1) >= self.start.saturating_add(total_pages) {
                return Ok(NextPage::Done(StopReason::TotalReached));
            }
        }

        if page_items < page_size as usize {
            return Ok(NextPage::Done(StopReason::ShortPage));
        }

        Ok(NextPage::Continue(Cursor::Page(page.saturating_add(1))))
    }
}

// ============================================================================
// No Pagination
// ============================================================================

/// No pagination - single request
#[derive(Debug, Clone, Default)]
pub struct NoPaginator;

impl Paginator for NoPaginator {
    fn initial_cursor(&self) -> Option<Cursor> {
        None
    }

    fn next_page(
        &self,
        _body: &Value,
        _page_items: usize,
        _page_size: u32,
        _current: Option<&Cursor>,
    ) -> Result<NextPage> {
        Ok(NextPage::Done(StopReason::SinglePage))
    }
}

/// Read a count field; numbers given as strings are accepted
fn read_count(body: &Value, path: Option<&str>) -> Result<Option<u64>> {
    let Some(path) = path else {
        return Ok(None);
    };
    Ok(extract_scalar(body, path)?.and_then(|s| s.parse().ok()))
}
