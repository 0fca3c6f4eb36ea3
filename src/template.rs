//! Template interpolation for endpoint definitions
//!
//! Handles `{{ variable }}` interpolation in request params, headers and
//! bodies. Supports nested access like `{{ vars.region }}`.
//!
//! Two rules shape the rendered request:
//! - a string that is exactly one placeholder keeps the JSON type of the
//!   substituted value, so `"{{ offset }}"` becomes the number `40`
//! - object entries that render to an empty string or null are dropped,
//!   so an absent cursor or location simply disappears from the request

use crate::error::{Error, Result};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Regex for matching template variables: {{ variable.path }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)\s*\}\}")
        .expect("template regex is valid")
});

/// Context for template interpolation
///
/// The root is a JSON object; the fetcher fills in `term`, `location`,
/// `page_size`, `cursor`, `offset`, `page` and `vars`.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    root: Map<String, Value>,
}

impl TemplateContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a top-level variable
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.root.insert(key.into(), value.into());
        self
    }

    /// Set a top-level variable (builder style)
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Get a value by path (e.g., "vars.region")
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.root.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }
}

/// Render a template string with the given context
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    let mut missing = Vec::new();

    let result = TEMPLATE_REGEX.replace_all(template, |cap: &regex::Captures<'_>| {
        let var_path = &cap[1];
        match ctx.get(var_path) {
            Some(value) => value_to_string(value),
            None => {
                missing.push(var_path.to_string());
                String::new()
            }
        }
    });

    if missing.is_empty() {
        Ok(result.into_owned())
    } else {
        Err(Error::undefined_var(missing.join(", ")))
    }
}

/// Check if a string contains template variables
pub fn has_templates(s: &str) -> bool {
    TEMPLATE_REGEX.is_match(s)
}

/// Extract all variable names from a template
pub fn extract_variables(template: &str) -> Vec<String> {
    TEMPLATE_REGEX
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Convert a JSON value to a string for template substitution
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// If `s` is exactly one placeholder, return its variable path
fn sole_placeholder(s: &str) -> Option<&str> {
    let cap = TEMPLATE_REGEX.captures(s.trim())?;
    if cap.get(0)?.as_str().len() == s.trim().len() {
        Some(cap.get(1)?.as_str())
    } else {
        None
    }
}

/// Render all strings in a JSON value, keeping the type of sole placeholders
/// and pruning object entries that come out empty.
pub fn render_value(value: &Value, ctx: &TemplateContext) -> Result<Value> {
    match value {
        Value::String(s) => {
            if let Some(var_path) = sole_placeholder(s) {
                return ctx
                    .get(var_path)
                    .cloned()
                    .ok_or_else(|| Error::undefined_var(var_path));
            }
            if has_templates(s) {
                Ok(Value::String(render(s, ctx)?))
            } else {
                Ok(value.clone())
            }
        }
        Value::Object(map) => {
            let mut rendered = Map::new();
            for (k, v) in map {
                let v = render_value(v, ctx)?;
                if !is_blank(&v) {
                    rendered.insert(k.clone(), v);
                }
            }
            Ok(Value::Object(rendered))
        }
        Value::Array(arr) => arr
            .iter()
            .map(|v| render_value(v, ctx))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        _ => Ok(value.clone()),
    }
}

/// Render a value into the string form sent on the wire. Strings are sent
/// as-is; structured values are JSON-encoded (GraphQL `variables` style).
/// Returns `None` when the value renders blank.
pub fn render_param(value: &Value, ctx: &TemplateContext) -> Result<Option<String>> {
    let rendered = render_value(value, ctx)?;
    if is_blank(&rendered) {
        return Ok(None);
    }
    Ok(Some(match rendered {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => serde_json::to_string(&other)?,
    }))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
