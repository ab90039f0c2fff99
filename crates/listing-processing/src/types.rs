use crate::error::{ListingError, Result};
use crate::fields;
use crate::normalizers::{HEATING_CATEGORIES, SERVICES};
use crate::utils::non_blank;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Raw Records
// ============================================================================

/// One scraped listing: raw portal field label to raw text.
///
/// Keys are canonicalized on construction (see [`fields::RENAMES`]), so
/// lookups use canonical names for renamed fields and raw labels otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawListing {
    fields: BTreeMap<String, String>,
}

impl RawListing {
    /// Build a listing from `(raw label, raw text)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let fields = pairs
            .into_iter()
            .map(|(label, value)| (fields::canonical_name(label.as_ref()).to_string(), value.into()))
            .collect();
        Self { fields }
    }

    /// Raw text of a field. Missing, empty and whitespace-only values are
    /// all reported as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        non_blank(self.fields.get(name).map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for RawListing {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

// ============================================================================
// Cleaned Records
// ============================================================================

/// Storage type of an output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Int,
    Float,
    Bool,
    Text,
}

impl FeatureKind {
    pub fn dtype(&self) -> DataType {
        match self {
            Self::Int => DataType::Int64,
            Self::Float => DataType::Float64,
            Self::Bool => DataType::Boolean,
            Self::Text => DataType::String,
        }
    }
}

/// A typed cell of a cleaned listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(Option<String>),
}

impl FeatureValue {
    pub fn kind(&self) -> FeatureKind {
        match self {
            Self::Int(_) => FeatureKind::Int,
            Self::Float(_) => FeatureKind::Float,
            Self::Bool(_) => FeatureKind::Bool,
            Self::Text(_) => FeatureKind::Text,
        }
    }
}

/// Why a listing was excluded from the batch.
///
/// Variants are declared in the order the transformer checks them; only the
/// first failing check is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    MissingYearBuilt,
    MissingLivingArea,
    MissingYardArea,
    IncomeBelowFloor,
}

impl DropReason {
    pub const ALL: [DropReason; 4] = [
        Self::MissingYearBuilt,
        Self::MissingLivingArea,
        Self::MissingYardArea,
        Self::IncomeBelowFloor,
    ];

    /// Get a human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::MissingYearBuilt => "Missing year built",
            Self::MissingLivingArea => "Missing living area",
            Self::MissingYardArea => "Missing yard area",
            Self::IncomeBelowFloor => "Income below floor",
        }
    }
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A fully typed listing. Every mandatory feature holds a real value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanedListing {
    pub address: Option<String>,
    pub build_type: Option<String>,
    pub price: i64,
    pub income: i64,
    pub build_eval: i64,
    pub land_eval: i64,
    pub units: i64,
    pub rooms: i64,
    pub bedrooms: i64,
    pub washrooms: i64,
    pub year_built: i32,
    pub living_area: f64,
    pub yard_area: f64,
    pub has_certificate: bool,
    /// 0 when the certificate year is unknown.
    pub year_certificate: i32,
    pub due_certificate: bool,
    pub near_water: bool,
    pub water_name: Option<String>,
    pub has_pool: bool,
    pub pool_type: Option<String>,
    pub total_parking: i64,
    /// Normalized heating labels joined with ", ". Empty, and null in the
    /// output table, when the listing states there is no heating.
    pub heating: String,
    /// Indexed like [`HEATING_CATEGORIES`].
    pub heating_flags: [bool; HEATING_CATEGORIES.len()],
    pub water_access: bool,
    pub has_fireplace: bool,
    pub fireplace_func: bool,
    pub has_reno: bool,
    /// 0 when no renovation year is known.
    pub last_year_reno: i32,
    /// Indexed like [`SERVICES`].
    pub service_flags: [bool; SERVICES.len()],
}

impl CleanedListing {
    /// The listing as `(column, value)` pairs in output schema order.
    pub fn values(&self) -> Vec<(&'static str, FeatureValue)> {
        use FeatureValue::{Bool, Float, Int, Text};

        let mut values = vec![
            ("address", Text(self.address.clone())),
            (fields::BUILD_TYPE, Text(self.build_type.clone())),
            (fields::PRICE, Int(self.price)),
            (fields::INCOME, Int(self.income)),
            (fields::BUILD_EVAL, Int(self.build_eval)),
            (fields::LAND_EVAL, Int(self.land_eval)),
            (fields::UNITS, Int(self.units)),
            (fields::ROOMS, Int(self.rooms)),
            (fields::BEDROOMS, Int(self.bedrooms)),
            (fields::WASHROOMS, Int(self.washrooms)),
            ("year_built", Int(i64::from(self.year_built))),
            ("living_area", Float(self.living_area)),
            ("yard_area", Float(self.yard_area)),
            ("has_certificate", Bool(self.has_certificate)),
            ("year_certificate", Int(i64::from(self.year_certificate))),
            ("due_certificate", Bool(self.due_certificate)),
            ("near_water", Bool(self.near_water)),
            ("water_name", Text(self.water_name.clone())),
            ("has_pool", Bool(self.has_pool)),
            ("pool_type", Text(self.pool_type.clone())),
            ("total_parking", Int(self.total_parking)),
            ("heating", Text(Some(self.heating.clone()).filter(|h| !h.is_empty()))),
        ];

        values.extend(
            HEATING_CATEGORIES
                .iter()
                .zip(self.heating_flags)
                .map(|((_, column), flag)| (*column, Bool(flag))),
        );

        values.extend([
            ("water_access", Bool(self.water_access)),
            ("has_fireplace", Bool(self.has_fireplace)),
            ("fireplace_func", Bool(self.fireplace_func)),
            ("has_reno", Bool(self.has_reno)),
            ("last_year_reno", Int(i64::from(self.last_year_reno))),
        ]);

        values.extend(
            SERVICES
                .iter()
                .zip(self.service_flags)
                .map(|((_, column), flag)| (*column, Bool(flag))),
        );

        values
    }

    /// Value of a single output column.
    pub fn get(&self, column: &str) -> Option<FeatureValue> {
        self.values()
            .into_iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    /// The fixed output schema shared by every cleaned listing.
    pub fn schema() -> Vec<(&'static str, FeatureKind)> {
        Self::default()
            .values()
            .into_iter()
            .map(|(name, value)| (name, value.kind()))
            .collect()
    }
}

// ============================================================================
// Feature Batch
// ============================================================================

/// Retained listings in input order, sharing one fixed schema.
#[derive(Debug, Clone)]
pub struct FeatureBatch {
    schema: Vec<(&'static str, FeatureKind)>,
    rows: Vec<CleanedListing>,
}

impl FeatureBatch {
    pub fn new(rows: Vec<CleanedListing>) -> Self {
        Self {
            schema: CleanedListing::schema(),
            rows,
        }
    }

    pub fn schema(&self) -> &[(&'static str, FeatureKind)] {
        &self.schema
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.schema.iter().map(|(name, _)| *name).collect()
    }

    pub fn rows(&self) -> &[CleanedListing] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<CleanedListing> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Assemble a polars DataFrame with one typed column per schema entry.
    ///
    /// An empty batch yields a zero-row frame that still carries the schema.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let row_values: Vec<Vec<(&'static str, FeatureValue)>> =
            self.rows.iter().map(CleanedListing::values).collect();

        let mut columns: Vec<Column> = Vec::with_capacity(self.schema.len());
        for (index, (name, kind)) in self.schema.iter().enumerate() {
            let cells = row_values.iter().map(|values| &values[index].1);
            let series = match kind {
                FeatureKind::Int => Series::new(
                    (*name).into(),
                    cells
                        .map(|cell| match cell {
                            FeatureValue::Int(v) => Ok(*v),
                            other => Err(schema_mismatch(name, other)),
                        })
                        .collect::<Result<Vec<i64>>>()?,
                ),
                FeatureKind::Float => Series::new(
                    (*name).into(),
                    cells
                        .map(|cell| match cell {
                            FeatureValue::Float(v) => Ok(*v),
                            other => Err(schema_mismatch(name, other)),
                        })
                        .collect::<Result<Vec<f64>>>()?,
                ),
                FeatureKind::Bool => Series::new(
                    (*name).into(),
                    cells
                        .map(|cell| match cell {
                            FeatureValue::Bool(v) => Ok(*v),
                            other => Err(schema_mismatch(name, other)),
                        })
                        .collect::<Result<Vec<bool>>>()?,
                ),
                FeatureKind::Text => Series::new(
                    (*name).into(),
                    cells
                        .map(|cell| match cell {
                            FeatureValue::Text(v) => Ok(v.clone()),
                            other => Err(schema_mismatch(name, other)),
                        })
                        .collect::<Result<Vec<Option<String>>>>()?,
                ),
            };
            columns.push(Column::from(series));
        }

        Ok(DataFrame::new(columns)?)
    }
}

fn schema_mismatch(column: &str, value: &FeatureValue) -> ListingError {
    ListingError::Internal(format!(
        "column '{}' received a {:?} value",
        column,
        value.kind()
    ))
}

// ============================================================================
// Run Summary
// ============================================================================

/// Counts and diagnostics of one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,
    /// Rows read from the input.
    pub rows_in: usize,
    /// Rows kept in the feature batch.
    pub rows_retained: usize,
    /// Excluded rows per reason.
    pub drops: BTreeMap<DropReason, usize>,
    /// Number of output columns.
    pub columns_out: usize,
    /// Warnings generated during the run.
    pub warnings: Vec<String>,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one excluded row.
    pub fn record_drop(&mut self, reason: DropReason) {
        *self.drops.entry(reason).or_insert(0) += 1;
    }

    /// Excluded rows for one reason.
    pub fn dropped(&self, reason: DropReason) -> usize {
        self.drops.get(&reason).copied().unwrap_or(0)
    }

    pub fn rows_dropped(&self) -> usize {
        self.drops.values().sum()
    }

    /// Add a warning to the summary.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Calculate the percentage of rows dropped.
    pub fn rows_dropped_percentage(&self) -> f32 {
        if self.rows_in == 0 {
            0.0
        } else {
            (self.rows_dropped() as f32 / self.rows_in as f32) * 100.0
        }
    }
}

/// Output of [`crate::Pipeline::process`].
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub batch: FeatureBatch,
    pub dataframe: DataFrame,
    pub summary: BatchSummary,
    /// Path of the written CSV when `save_to_disk` is enabled.
    pub output_path: Option<std::path::PathBuf>,
}

// ============================================================================
// Tests
// ============================================================================
