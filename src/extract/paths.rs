//! Path expressions and extraction helpers

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A parsed path into a JSON document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathExpr {
    /// RFC 6901 JSON Pointer
    Pointer(String),
    /// Dot notation, e.g. `$.data.items[0]`
    Dotted(String),
    /// Full JSONPath expression evaluated by jsonpath-rust
    JsonPath(String),
}

impl PathExpr {
    /// Parse a path, validating JSONPath expressions eagerly
    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() || path.starts_with('/') {
            return Ok(Self::Pointer(path.to_string()));
        }

        if is_jsonpath(path) {
            compile_jsonpath(path)?;
            return Ok(Self::JsonPath(path.to_string()));
        }

        Ok(Self::Dotted(path.to_string()))
    }

    /// Select the value at this path.
    ///
    /// Returns `None` when nothing matches. A JSONPath selection yields an
    /// array of all matches.
    pub fn select(&self, value: &Value) -> Result<Option<Value>> {
        match self {
            Self::Pointer(pointer) => Ok(value.pointer(pointer).cloned()),
            Self::Dotted(path) => Ok(select_dotted(value, path).cloned()),
            Self::JsonPath(path) => {
                let matches = select_jsonpath(value, path)?;
                if matches.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(Value::Array(matches)))
                }
            }
        }
    }

    /// Whether this expression is evaluated as JSONPath
    pub fn is_jsonpath(&self) -> bool {
        matches!(self, Self::JsonPath(_))
    }
}

/// Select the value at `path` inside `value`
pub fn select(value: &Value, path: &str) -> Result<Option<Value>> {
    PathExpr::parse(path)?.select(value)
}

/// Extract the result items of one page.
///
/// Fails with `MalformedResponse` when the path does not resolve or does not
/// point at an array. For JSONPath the match list is the item list, except
/// that a single match which is itself an array is unwrapped (`$..results`).
///
/// With `allow_missing`, a path that matches nothing yields an empty page
/// instead. Use it for APIs that drop the items field on their last page.
pub fn extract_items(body: &Value, path: &str, allow_missing: bool) -> Result<Vec<Value>> {
    let expr = PathExpr::parse(path)?;
    match expr.select(body)? {
        Some(Value::Array(items)) if expr.is_jsonpath() => match <[Value; 1]>::try_from(items) {
            Ok([Value::Array(inner)]) => Ok(inner),
            Ok([single]) => Ok(vec![single]),
            Err(items) => Ok(items),
        },
        None if allow_missing => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(Error::malformed(format!(
            "items at '{path}' is {}, expected an array",
            type_name(&other)
        ))),
        None => Err(Error::malformed(format!(
            "items field '{path}' missing from response"
        ))),
    }
}

/// Extract a scalar (string, number or bool) as a string.
///
/// JSONPath selections use their first match. Null, objects, arrays and
/// missing values yield `None`.
pub fn extract_scalar(body: &Value, path: &str) -> Result<Option<String>> {
    let expr = PathExpr::parse(path)?;
    let selected = match expr.select(body)? {
        Some(Value::Array(mut matches)) if expr.is_jsonpath() => {
            if matches.is_empty() {
                None
            } else {
                Some(matches.swap_remove(0))
            }
        }
        other => other,
    };

    Ok(selected.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }))
}

/// Project an item into a flat record using a field mapping.
///
/// Each output field takes the value at its path relative to the item;
/// anything missing becomes null.
pub fn project(item: &Value, fields: &BTreeMap<String, String>) -> Result<Value> {
    let mut record = Map::new();
    for (name, path) in fields {
        let value = PathExpr::parse(path)?.select(item)?.unwrap_or(Value::Null);
        record.insert(name.clone(), value);
    }
    Ok(Value::Object(record))
}

fn is_jsonpath(path: &str) -> bool {
    path.contains("..") || path.contains('*') || path.contains("[?") || path.contains("['")
}

fn compile_jsonpath(path: &str) -> Result<jsonpath_rust::JsonPath> {
    jsonpath_rust::JsonPath::try_from(path)
        .map_err(|e| Error::json_path(format!("Invalid JSONPath '{path}': {e}")))
}

/// Evaluate a JSONPath expression, returning the list of matches
fn select_jsonpath(value: &Value, path: &str) -> Result<Vec<Value>> {
    let jp = compile_jsonpath(path)?;

    match jp.find(value) {
        Value::Array(arr) => Ok(arr),
        Value::Null => Ok(vec![]),
        other => Ok(vec![other]),
    }
}

/// Walk a dot-notation path (with `[n]` / `[-n]` indices)
fn select_dotted<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix('$').unwrap_or(path);
    let path = path.strip_prefix('.').unwrap_or(path);
    if path.is_empty() {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        let (name, indices) = match part.find('[') {
            Some(pos) => (&part[..pos], &part[pos..]),
            None => (part, ""),
        };

        if !name.is_empty() {
            current = current.get(name)?;
        }

        for index in indices.split('[').filter(|s| !s.is_empty()) {
            let index: i64 = index.strip_suffix(']')?.parse().ok()?;
            let arr = current.as_array()?;
            #[allow(clippy::cast_possible_wrap)]
            let idx = if index < 0 {
                usize::try_from(arr.len() as i64 + index).ok()?
            } else {
                usize::try_from(index).ok()?
            };
            current = arr.get(idx)?;
        }
    }

    Some(current)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
