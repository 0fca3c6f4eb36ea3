//! Search query supplied by the caller

use serde::{Deserialize, Serialize};

/// Default number of items requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A search request: what to look for, where, and how many items per page.
///
/// Built once per invocation and only ever borrowed by the fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Search term
    pub term: String,
    /// Optional location (job and business searches)
    pub location: Option<String>,
    /// Requested page size
    pub page_size: u32,
}

impl Query {
    /// Create a query with the default page size and no location
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            location: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the location
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder() {
        let query = Query::new("rust developer")
            .with_location("Berlin")
            .with_page_size(15);

        assert_eq!(query.term, "rust developer");
        assert_eq!(query.location.as_deref(), Some("Berlin"));
        assert_eq!(query.page_size, 15);
    }

    #[test]
    fn test_query_defaults() {
        let query = Query::new("coffee");
        assert!(query.location.is_none());
        assert_eq!(query.page_size, DEFAULT_PAGE_SIZE);
    }
}
