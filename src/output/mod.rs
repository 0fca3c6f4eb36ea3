//! Output module
//!
//! Handles writing fetched items as JSON.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Naming result files after the endpoint, query and item count
//! - Writing pretty-printed JSON files (creating the directory)
//! - Rendering JSON for stdout

mod writer;

pub use writer::{result_filename, save_json, to_json_string};
