//! Dataset file loading.
//!
//! Supports delimited text (CSV/TSV) and JSON exports (JSON lines or a single
//! array of objects). The format is picked from the file extension.

use super::{Cell, Dataset, Record, REQUIRED_COLUMNS};
use crate::error::{PatclassError, Result};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// On-disk dataset formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    /// Comma separated values with a header row
    Csv,
    /// Tab separated values with a header row
    Tsv,
    /// One JSON object per line
    JsonLines,
    /// A JSON array of objects
    Json,
}

impl DatasetFormat {
    /// Infers the format from a path's extension.
    ///
    /// # Errors
    ///
    /// Returns [`PatclassError::FormatError`] for unknown extensions.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "jsonl" | "ndjson" => Ok(Self::JsonLines),
            "json" => Ok(Self::Json),
            _ => Err(PatclassError::FormatError {
                message: format!(
                    "unsupported dataset extension '{ext}' for {}, expected csv, tsv, jsonl, ndjson or json",
                    path.display()
                ),
            }),
        }
    }
}

/// Loads a dataset file and checks the required schema.
///
/// # Errors
///
/// * [`PatclassError::Io`] if the file is missing or unreadable
/// * [`PatclassError::FormatError`] if a row cannot be parsed
/// * [`PatclassError::Schema`] if a required column is absent
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let format = DatasetFormat::from_path(path)?;
    let file = File::open(path)?;

    debug!(path = %path.display(), ?format, "reading dataset");
    let dataset = match format {
        DatasetFormat::Csv => read_delimited(file, b',')?,
        DatasetFormat::Tsv => read_delimited(file, b'\t')?,
        DatasetFormat::JsonLines => read_json_lines(file)?,
        DatasetFormat::Json => read_json_array(file)?,
    };

    for column in REQUIRED_COLUMNS {
        if !dataset.has_column(column) {
            return Err(PatclassError::missing_column(
                column,
                &format!("required by {}", path.display()),
            ));
        }
    }

    info!(
        path = %path.display(),
        rows = dataset.n_rows(),
        columns = dataset.columns().len(),
        "loaded dataset"
    );
    Ok(dataset)
}

/// Loads a dataset file as typed records.
///
/// # Errors
///
/// Same as [`load_dataset`], plus [`PatclassError::FormatError`] for labels
/// that are not 0-255 integers.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    load_dataset(path)?.to_records()
}

fn read_delimited(file: File, delimiter: u8) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(BufReader::new(file));

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(to_cell).collect());
    }

    Dataset::new(headers, rows)
}

fn read_json_lines(file: File) -> Result<Dataset> {
    let mut objects = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line).map_err(|e| PatclassError::FormatError {
            message: format!("line {}: {e}", idx + 1),
        })?;
        objects.push(into_object(value, idx + 1)?);
    }
    objects_to_dataset(objects)
}

fn read_json_array(file: File) -> Result<Dataset> {
    let value: Value =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| PatclassError::FormatError {
            message: format!("line {}: {e}", e.line()),
        })?;

    let Value::Array(items) = value else {
        return Err(PatclassError::FormatError {
            message: "expected a top-level JSON array of objects".to_string(),
        });
    };

    let objects = items
        .into_iter()
        .enumerate()
        .map(|(i, v)| into_object(v, i + 1))
        .collect::<Result<Vec<_>>>()?;
    objects_to_dataset(objects)
}

fn into_object(value: Value, position: usize) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(PatclassError::FormatError {
            message: format!("entry {position}: expected an object, got {other}"),
        }),
    }
}

/// Column order follows first appearance; keys absent from an object are null.
fn objects_to_dataset(objects: Vec<Map<String, Value>>) -> Result<Dataset> {
    let mut columns: Vec<String> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = objects
        .iter()
        .map(|object| {
            columns
                .iter()
                .map(|c| object.get(c).and_then(json_cell))
                .collect()
        })
        .collect();

    Dataset::new(columns, rows)
}

fn json_cell(value: &Value) -> Cell {
    match value {
        Value::Null => None,
        Value::String(s) => to_cell(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn to_cell(raw: &str) -> Cell {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}
