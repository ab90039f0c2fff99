//! Loading raw listing tables and turning them into [`RawListing`] rows.
//!
//! Every raw column is read as text. Typing is the transformer's job, so the
//! CSV reader must never infer numeric dtypes from the portal's formatted
//! values ("300 000 $" would otherwise become a parse failure).

use crate::error::{ListingError, Result, ResultExt};
use crate::fields::required_columns;
use crate::types::RawListing;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use serde_json::Value;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Input formats understood by [`load_listings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    /// Detect the format from the file extension. Anything that is not
    /// `.json` is read as CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

/// Load a raw listing table from a CSV or JSON file.
pub fn load_listings(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ListingError::UnsupportedInput(format!(
            "input file not found: {}",
            path.display()
        )));
    }

    let df = match InputFormat::from_path(path) {
        InputFormat::Csv => load_csv_with_fallbacks(path)?,
        InputFormat::Json => {
            let content = std::fs::read_to_string(path)
                .context(format!("Failed to read {}", path.display()))?;
            listings_from_json_str(&content)?
        }
    };

    info!(
        "Loaded {} listing(s) with {} column(s) from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

fn text_csv_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_infer_schema_length(Some(0))
        .with_has_header(true)
}

/// Load a CSV with every column as text, retrying with looser settings.
pub fn load_csv_with_fallbacks(path: &Path) -> Result<DataFrame> {
    // Strategy 1: explicit quote handling
    match text_csv_options()
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    // Strategy 2: default parse options
    match text_csv_options()
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Loading with default options failed: {}", e);
        }
    }

    // Strategy 3: pre-clean content
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cursor = Cursor::new(clean_csv_content(&content));
            text_csv_options()
                .into_reader_with_file_handle(cursor)
                .finish()
                .context(format!("Failed to parse CSV {}", path.display()))
        }
        Err(e) => {
            error!("Could not read file: {}", e);
            Err(e.into())
        }
    }
}

/// Collapse doubled quotes and drop blank lines.
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build a text table from the scraper's JSON output: an array of objects.
///
/// Strings are kept, numbers and booleans are stringified, `null` is
/// absent. Columns appear in first-seen order; keys missing from a record
/// are absent for that record.
pub fn listings_from_json_str(content: &str) -> Result<DataFrame> {
    let value: Value = serde_json::from_str(content)?;
    let Value::Array(records) = value else {
        return Err(ListingError::UnsupportedInput(
            "expected a JSON array of listing objects".to_string(),
        ));
    };

    let mut columns: Vec<(String, Vec<Option<String>>)> = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let Value::Object(fields) = record else {
            return Err(ListingError::UnsupportedInput(format!(
                "record {} is not a JSON object",
                index
            )));
        };
        for (key, value) in fields {
            let position = match columns.iter().position(|(name, _)| name == key) {
                Some(position) => position,
                None => {
                    columns.push((key.clone(), vec![None; index]));
                    columns.len() - 1
                }
            };
            columns[position].1.push(json_text(value));
        }
        for (_, cells) in columns.iter_mut() {
            cells.resize(index + 1, None);
        }
    }

    let columns: Vec<Column> = columns
        .into_iter()
        .map(|(name, cells)| Column::from(Series::new(name.as_str().into(), cells)))
        .collect();
    Ok(DataFrame::new(columns)?)
}

fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Check that every raw column the transformer reads is present.
///
/// All missing columns are reported together.
pub fn validate_schema(df: &DataFrame) -> Result<()> {
    let present: Vec<&str> = df.get_column_names().into_iter().map(|c| c.as_str()).collect();
    let missing: Vec<String> = required_columns()
        .into_iter()
        .filter(|column| !present.contains(column))
        .map(String::from)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ListingError::MissingColumns(missing))
    }
}

/// Split a table into one [`RawListing`] per row, in row order.
///
/// Non-text columns are cast to text first; nulls become absent fields.
pub fn raw_listings(df: &DataFrame) -> Result<Vec<RawListing>> {
    let mut rows: Vec<Vec<(String, String)>> = vec![Vec::new(); df.height()];

    for column in df.get_columns() {
        let name = column.name().to_string();
        let series = column
            .as_materialized_series()
            .cast(&DataType::String)
            .context(format!("Failed to read column '{}' as text", name))?;
        for (row, value) in rows.iter_mut().zip(series.str()?.into_iter()) {
            if let Some(value) = value {
                row.push((name.clone(), value.to_string()));
            }
        }
    }

    Ok(rows.into_iter().map(RawListing::from_pairs).collect())
}
