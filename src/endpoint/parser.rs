//! YAML parser for endpoint definitions
//!
//! Parses and validates endpoint YAML files.
//! Supports both built-in presets (by name) and custom YAML files (by path).

use crate::auth::AuthStep;
use crate::endpoint::types::EndpointConfig;
use crate::error::{Error, Result};
use crate::extract::PathExpr;
use crate::presets;
use crate::template::{extract_variables, has_templates};
use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Variables a page request can reference
const TEMPLATE_ROOTS: &[&str] = &[
    "term",
    "location",
    "page_size",
    "cursor",
    "offset",
    "page",
    "vars",
];

/// Load an endpoint definition from a preset name or file path
///
/// This function first checks if the input is a built-in preset name (e.g., "yelp"),
/// then falls back to loading from a file path.
///
/// # Examples
///
/// ```ignore
/// // Load built-in preset by name
/// let endpoint = load_endpoint("twitter")?;
///
/// // Load custom endpoint from file
/// let endpoint = load_endpoint("./endpoints/my-site.yaml")?;
/// ```
pub fn load_endpoint(path: impl AsRef<Path>) -> Result<EndpointConfig> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();

    // Bare names are looked up among the presets first
    if !path_str.contains('/')
        && !path_str.contains('\\')
        && !path_str.ends_with(".yaml")
        && !path_str.ends_with(".yml")
    {
        if let Some(yaml) = presets::get_builtin(&path_str) {
            return load_endpoint_from_str(yaml);
        }
    }

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::config(format!(
                "Endpoint '{}' not found. Built-in presets: {}. Or provide a path to a YAML file.",
                path.display(),
                presets::list_builtin().join(", ")
            ))
        } else {
            Error::config(format!(
                "Failed to read endpoint file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    load_endpoint_from_str(&content)
}

/// Load an endpoint definition from a YAML string
pub fn load_endpoint_from_str(yaml: &str) -> Result<EndpointConfig> {
    let endpoint: EndpointConfig = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse endpoint YAML: {e}")))?;

    validate_endpoint(&endpoint)?;
    Ok(endpoint)
}

/// Validate an endpoint definition
pub fn validate_endpoint(endpoint: &EndpointConfig) -> Result<()> {
    if endpoint.name.is_empty() {
        return Err(Error::config("Endpoint name cannot be empty"));
    }

    if endpoint.base_url.is_empty() {
        return Err(Error::config("Endpoint base_url cannot be empty"));
    }
    // Templated URLs can only be checked once rendered
    if !has_templates(&endpoint.base_url) {
        url::Url::parse(&endpoint.base_url)?;
    }

    PathExpr::parse(&endpoint.items_path)?;
    for path in endpoint.pagination.paths() {
        PathExpr::parse(path)?;
    }
    if let Some(ref fields) = endpoint.fields {
        for path in fields.values() {
            PathExpr::parse(path)?;
        }
    }

    if endpoint.page_size == Some(0) {
        return Err(Error::invalid_value("page_size", "must be greater than 0"));
    }
    if endpoint.max_pages == Some(0) {
        return Err(Error::invalid_value("max_pages", "must be greater than 0"));
    }
    if endpoint.timeout_secs == Some(0) {
        return Err(Error::invalid_value("timeout_secs", "must be greater than 0"));
    }
    if let Some(ref limit) = endpoint.rate_limit {
        if limit.burst == 0 {
            return Err(Error::invalid_value("rate_limit.burst", "must be greater than 0"));
        }
    }

    validate_templates("base_url", &endpoint.base_url)?;
    for (name, value) in &endpoint.headers {
        validate_templates(&format!("headers.{name}"), value)?;
    }
    for (name, value) in &endpoint.params {
        validate_value_templates(&format!("params.{name}"), value)?;
    }
    if let Some(ref body) = endpoint.body {
        validate_value_templates("body", body)?;
    }

    for step in &endpoint.auth {
        validate_auth_step(step)?;
    }

    Ok(())
}

/// Reject placeholders whose root is not a known context variable
fn validate_templates(field: &str, template: &str) -> Result<()> {
    for variable in extract_variables(template) {
        let root = variable.split('.').next().unwrap_or_default();
        if !TEMPLATE_ROOTS.contains(&root) {
            return Err(Error::template(format!(
                "unknown variable '{variable}' in {field} (expected one of: {})",
                TEMPLATE_ROOTS.join(", ")
            )));
        }
    }
    Ok(())
}

fn validate_value_templates(field: &str, value: &Value) -> Result<()> {
    match value {
        Value::String(s) => validate_templates(field, s),
        Value::Array(items) => items
            .iter()
            .try_for_each(|item| validate_value_templates(field, item)),
        Value::Object(map) => map
            .iter()
            .try_for_each(|(key, item)| validate_value_templates(&format!("{field}.{key}"), item)),
        _ => Ok(()),
    }
}

fn validate_auth_step(step: &AuthStep) -> Result<()> {
    if step.header().is_empty() {
        return Err(Error::invalid_value("auth.header", "cannot be empty"));
    }
    url::Url::parse(step.url())?;

    match step {
        AuthStep::JsonToken { token_path, .. } => {
            PathExpr::parse(token_path)?;
        }
        AuthStep::HtmlToken { pattern, .. } => {
            let regex = Regex::new(pattern)
                .map_err(|e| Error::invalid_value("auth.pattern", e.to_string()))?;
            if regex.captures_len() < 2 {
                return Err(Error::invalid_value(
                    "auth.pattern",
                    format!("'{pattern}' needs a capture group for the token"),
                ));
            }
        }
    }

    Ok(())
}
