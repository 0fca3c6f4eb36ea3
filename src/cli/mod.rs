//! CLI module
//!
//! Command-line interface for fetching from endpoints.
//!
//! # Commands
//!
//! - `fetch` - Fetch all pages of an endpoint for a search term
//! - `list` - List built-in endpoints
//! - `show` - Print an endpoint definition as YAML
//! - `validate` - Validate an endpoint definition
//! - `har` - Inspect HAR captures (calls, cookies, endpoint skeletons)

mod commands;
mod runner;

pub use commands::{Cli, Commands, FetchArgs, HarCommands};
pub use runner::Runner;
