//! Built-in endpoint definitions embedded in the binary
//!
//! This module embeds the bundled endpoint YAML files directly into the binary,
//! allowing users to use `--endpoint yelp` instead of specifying a file path.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Built-in endpoint YAML definitions
pub static BUILTIN_ENDPOINTS: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| {
        let mut m = HashMap::new();

        // Social
        m.insert("twitter", include_str!("../endpoints/twitter.yaml"));

        // Jobs
        m.insert("indeed", include_str!("../endpoints/indeed.yaml"));

        // Local businesses
        m.insert("yelp", include_str!("../endpoints/yelp.yaml"));

        m
    });

/// Get a built-in endpoint by name
pub fn get_builtin(name: &str) -> Option<&'static str> {
    BUILTIN_ENDPOINTS.get(name).copied()
}

/// Check if a name refers to a built-in endpoint
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_ENDPOINTS.contains_key(name)
}

/// List all built-in endpoint names
pub fn list_builtin() -> Vec<&'static str> {
    let mut names: Vec<_> = BUILTIN_ENDPOINTS.keys().copied().collect();
    names.sort_unstable();
    names
}
