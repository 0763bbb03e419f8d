//! Loading and saving tables.
//!
//! A table is a polars [`DataFrame`]. The loader infers column types the way
//! the polars CSV reader does; only empty fields become missing, so a literal
//! `NA` stays text until a cleaning step says otherwise.

use crate::error::{Result, TidyError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Broad classification of a column's dtype used by the cleaning steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Integer or floating point values
    Numeric,
    /// UTF-8 strings
    Text,
    /// Booleans, temporal values and anything else
    Other,
}

impl ColumnKind {
    pub fn from_dtype(dtype: &DataType) -> Self {
        if dtype.is_primitive_numeric() {
            Self::Numeric
        } else if matches!(dtype, DataType::String) {
            Self::Text
        } else {
            Self::Other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Numeric => "Numeric",
            Self::Text => "Text",
            Self::Other => "Other",
        }
    }
}

/// Column names paired with their kind, in table order.
pub fn column_kinds(df: &DataFrame) -> Vec<(String, ColumnKind)> {
    df.get_columns()
        .iter()
        .map(|c| (c.name().to_string(), ColumnKind::from_dtype(c.dtype())))
        .collect()
}

/// Names of the columns of one kind, in table order.
pub fn columns_of_kind(df: &DataFrame, kind: ColumnKind) -> Vec<String> {
    column_kinds(df)
        .into_iter()
        .filter(|(_, k)| *k == kind)
        .map(|(name, _)| name)
        .collect()
}

/// Options for [`load_table`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Rows scanned for type inference. `None` scans the whole file.
    #[serde(default)]
    pub infer_schema_length: Option<usize>,
}

/// Options for [`save_table`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOptions {
    /// Replace the destination if it already exists
    #[serde(default = "default_true")]
    pub overwrite: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { overwrite: true }
    }
}

fn default_true() -> bool {
    true
}

/// Read a CSV file with a header row into a table.
///
/// # Errors
///
/// [`TidyError::File`] when the path is missing, a directory, or unreadable;
/// [`TidyError::Parse`] when the content is not valid CSV (empty file, rows
/// with more fields than the header, values that do not fit the inferred type).
pub fn load_table(path: &Path, options: &LoadOptions) -> Result<DataFrame> {
    if path.is_dir() {
        return Err(TidyError::File(format!(
            "{} is a directory, not a CSV file",
            path.display()
        )));
    }
    std::fs::File::open(path)
        .map_err(|e| TidyError::File(format!("Cannot open {}: {e}", path.display())))?;

    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(options.infer_schema_length)
        .finish()
        .and_then(LazyFrame::collect)
        .map_err(|e| TidyError::Parse(format!("Failed to read {}: {e}", path.display())))?;

    tracing::debug!(
        "Loaded {} ({} rows x {} columns)",
        path.display(),
        df.height(),
        df.width()
    );
    Ok(df)
}

/// Write a table as comma-separated text with a header row and no index.
///
/// The data goes to a temporary file next to `path` which is then renamed
/// over the destination; a failed write leaves no partial output behind.
/// Missing parent directories are created.
///
/// # Errors
///
/// [`TidyError::File`] when the destination exists and `overwrite` is off, or
/// when the directory or file cannot be created or written.
pub fn save_table(df: &mut DataFrame, path: &Path, options: &WriteOptions) -> Result<()> {
    if path.is_dir() {
        return Err(TidyError::File(format!(
            "{} is a directory, not a file",
            path.display()
        )));
    }
    if path.exists() && !options.overwrite {
        return Err(TidyError::File(format!(
            "Output file already exists and overwrite is off: {}",
            path.display()
        )));
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| {
        TidyError::File(format!(
            "Failed to create output directory {}: {e}",
            dir.display()
        ))
    })?;

    let mut staging = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        TidyError::File(format!(
            "Cannot create a temporary file in {}: {e}",
            dir.display()
        ))
    })?;

    CsvWriter::new(staging.as_file_mut())
        .include_header(true)
        .finish(df)
        .map_err(|e| TidyError::File(format!("Failed to write CSV data: {e}")))?;
    staging
        .as_file()
        .sync_all()
        .map_err(|e| TidyError::File(format!("Failed to flush CSV data: {e}")))?;

    staging
        .persist(path)
        .map_err(|e| TidyError::File(format!("Cannot write {}: {}", path.display(), e.error)))?;

    tracing::debug!(
        "Wrote {} ({} rows x {} columns)",
        path.display(),
        df.height(),
        df.width()
    );
    Ok(())
}
