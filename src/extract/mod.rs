//! Path extraction module
//!
//! Supports: JSON Pointer, dot notation, JSONPath
//!
//! # Overview
//!
//! Endpoint definitions point at the interesting parts of a response with a
//! path string. The syntax is picked from the shape of the string:
//!
//! - `""`, `/data/items` - RFC 6901 JSON Pointer
//! - `$.data.items`, `data.items[0]` - dot notation with array indices
//! - `$..entries[*]`, `$.a[?(@.type=='x')]` - full JSONPath (jsonpath-rust)

mod paths;

pub use paths::{extract_items, extract_scalar, project, select, PathExpr};
