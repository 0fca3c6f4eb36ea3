// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # apitrail
//!
//! Call the undocumented JSON APIs that web apps use behind the scenes,
//! once they have been spotted in the browser's network panel.
//!
//! ## Features
//!
//! - **Declarative Endpoints**: headers, params, body templates and paths in YAML
//! - **Paginated Fetching**: token cursor, offset and page number conventions
//! - **Retry & Backoff**: 429/5xx retried with capped exponential backoff
//! - **Session Bootstrap**: guest tokens and CSRF tokens harvested before paging
//! - **Partial Results**: items gathered before an error are never discarded
//! - **HAR Tools**: turn a captured call into an endpoint skeleton
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use apitrail::{fetch_all, load_endpoint, FetchStatus, Query};
//!
//! #[tokio::main]
//! async fn main() -> apitrail::Result<()> {
//!     let endpoint = load_endpoint("yelp")?;
//!     let query = Query::new("pizza").with_location("San Francisco");
//!
//!     let outcome = fetch_all(&query, &endpoint).await?;
//!     match outcome.status {
//!         FetchStatus::Complete => println!("{} items", outcome.items.len()),
//!         FetchStatus::Partial(e) => println!("{} items, then: {e}", outcome.items.len()),
//!         FetchStatus::Failed(e) => eprintln!("failed: {e}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Fetcher                                  │
//! │  fetch_all(query) → FetchOutcome { items, status, stats }       │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │ Bootstrap│   HTTP    │   Paginate    │  Extract  │   Output    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ JSON tok │ Transport │ Cursor        │ Pointer   │ JSON files  │
//! │ HTML tok │ Retry     │ Offset        │ Dot path  │ stdout      │
//! │ Cookies  │ Rate Limit│ Page Number   │ JSONPath  │             │
//! │          │ Deadline  │               │ Fields    │             │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Search query
pub mod query;

/// Session bootstrap (token harvesting)
pub mod auth;

/// HTTP transport, retry and rate limiting
pub mod http;

/// Pagination strategies
pub mod pagination;

/// Path extraction from JSON responses
pub mod extract;

/// Template interpolation
pub mod template;

/// Endpoint definitions and YAML loader
pub mod endpoint;

/// Paginated fetcher
pub mod fetcher;

/// HAR capture parsing
pub mod har;

/// JSON result output
pub mod output;

/// Built-in endpoint definitions
pub mod presets;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use endpoint::{load_endpoint, load_endpoint_from_str, EndpointConfig};
pub use fetcher::{fetch_all, FetchOutcome, FetchStats, FetchStatus, Fetcher};
pub use query::Query;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
