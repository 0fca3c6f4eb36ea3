//! JSON result writer

use crate::error::Result;
use crate::query::Query;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// File name for a result set:
/// `{endpoint}_search_{term}[_{location}]_{count}.json`
pub fn result_filename(endpoint: &str, query: &Query, count: usize) -> String {
    let mut name = format!("{}_search_{}", sanitize(endpoint), sanitize(&query.term));
    if let Some(ref location) = query.location {
        name.push('_');
        name.push_str(&sanitize(location));
    }
    format!("{name}_{count}.json")
}

/// Spaces and path separators become underscores
fn sanitize(part: &str) -> String {
    part.trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            c => c,
        })
        .collect()
}

/// Write `value` as pretty JSON to `filename`, inside `dir` when given.
///
/// The directory is created if missing. Returns the written path.
pub fn save_json<T: Serialize + ?Sized>(
    value: &T,
    filename: &str,
    dir: Option<&Path>,
) -> Result<PathBuf> {
    let path = match dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            dir.join(filename)
        }
        None => PathBuf::from(filename),
    };

    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    info!("Data saved to {}", path.display());
    Ok(path)
}

/// Pretty JSON for printing
pub fn to_json_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
