//! Endpoint configuration module
//!
//! Parse endpoint definitions from YAML files.
//!
//! # Overview
//!
//! An endpoint definition captures everything site-specific about one
//! undocumented API: the request shape, which headers a browser sends,
//! where the items and the next cursor live in the response, and how to
//! bootstrap a session. The fetcher itself never branches on the site.
//!
//! The endpoint module provides:
//! - `EndpointConfig` - Declarative endpoint definition
//! - YAML parsing with validation
//! - Lookup of built-in presets by name

mod parser;
mod types;

pub use parser::{load_endpoint, load_endpoint_from_str, validate_endpoint};
pub use types::EndpointConfig;

#[cfg(test)]
mod tests;
