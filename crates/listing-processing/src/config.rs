//! Configuration types for the listing pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Income below this value marks a scraping or listing error.
pub const DEFAULT_INCOME_FLOOR: i64 = 2000;

/// Age in years after which a location certificate is overdue.
pub const DEFAULT_CERTIFICATE_MAX_AGE: i32 = 10;

/// Heating label assumed when a listing does not describe its heating.
pub const DEFAULT_HEATING: &str = "Plinthes électriques";

const DEFAULT_CHUNK_SIZE: usize = 256;
/// File stem of the cleaned CSV when no output name is configured.
pub const DEFAULT_OUTPUT_NAME: &str = "cleaned_listings";

/// Configuration for the listing pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use listing_processing::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .income_floor(2500)
///     .reference_year(2024)
///     .parallel(true)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Listings whose gross potential income is below this value are dropped.
    /// Default: 2000
    pub income_floor: i64,

    /// A certificate older than this many years is flagged as overdue.
    /// Default: 10
    pub certificate_max_age: i32,

    /// Year used as "now" for certificate age. `None` means the current
    /// calendar year at run time.
    /// Default: None
    pub reference_year: Option<i32>,

    /// Heating label used when the heating field is absent.
    /// Default: "Plinthes électriques"
    pub default_heating: String,

    /// Transform rows on the rayon thread pool.
    /// Default: false
    pub parallel: bool,

    /// Rows per chunk between progress updates and cancellation checks.
    /// Default: 256
    pub chunk_size: usize,

    /// Output directory for the cleaned CSV and reports.
    /// Default: "output"
    pub output_dir: PathBuf,

    /// Custom output file name (without extension).
    /// If None, uses "cleaned_listings".
    /// Default: None
    pub output_name: Option<String>,

    /// Whether to write the cleaned batch to disk.
    /// When false, results are kept in memory only.
    /// Default: true
    pub save_to_disk: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            income_floor: DEFAULT_INCOME_FLOOR,
            certificate_max_age: DEFAULT_CERTIFICATE_MAX_AGE,
            reference_year: None,
            default_heating: DEFAULT_HEATING.to_string(),
            parallel: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            output_dir: PathBuf::from("output"),
            output_name: None,
            save_to_disk: true,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// The year certificates are aged against.
    pub fn effective_reference_year(&self) -> i32 {
        self.reference_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }

    /// File stem of the cleaned CSV.
    pub fn effective_output_name(&self) -> &str {
        self.output_name.as_deref().unwrap_or(DEFAULT_OUTPUT_NAME)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.income_floor < 0 {
            return Err(ConfigValidationError::NegativeValue {
                field: "income_floor".to_string(),
                value: self.income_floor,
            });
        }

        if self.certificate_max_age < 0 {
            return Err(ConfigValidationError::NegativeValue {
                field: "certificate_max_age".to_string(),
                value: i64::from(self.certificate_max_age),
            });
        }

        if let Some(year) = self.reference_year
            && !(1800..=2200).contains(&year)
        {
            return Err(ConfigValidationError::InvalidReferenceYear(year));
        }

        if self.default_heating.trim().is_empty() {
            return Err(ConfigValidationError::EmptyDefaultHeating);
        }

        if self.chunk_size == 0 {
            return Err(ConfigValidationError::InvalidChunkSize(self.chunk_size));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid value for '{field}': {value} (must not be negative)")]
    NegativeValue { field: String, value: i64 },

    #[error("Invalid reference year: {0} (must be between 1800 and 2200)")]
    InvalidReferenceYear(i32),

    #[error("Default heating label must not be empty")]
    EmptyDefaultHeating,

    #[error("Invalid chunk size: {0} (must be at least 1)")]
    InvalidChunkSize(usize),
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    income_floor: Option<i64>,
    certificate_max_age: Option<i32>,
    reference_year: Option<i32>,
    default_heating: Option<String>,
    parallel: Option<bool>,
    chunk_size: Option<usize>,
    output_dir: Option<PathBuf>,
    output_name: Option<String>,
    save_to_disk: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Set the minimum gross potential income a listing must report.
    pub fn income_floor(mut self, floor: i64) -> Self {
        self.income_floor = Some(floor);
        self
    }

    /// Set the age in years after which a certificate is overdue.
    pub fn certificate_max_age(mut self, years: i32) -> Self {
        self.certificate_max_age = Some(years);
        self
    }

    /// Pin the year certificates are aged against.
    ///
    /// Useful for reproducible runs; defaults to the current year.
    pub fn reference_year(mut self, year: i32) -> Self {
        self.reference_year = Some(year);
        self
    }

    /// Set the heating label used when the heating field is absent.
    pub fn default_heating(mut self, label: impl Into<String>) -> Self {
        self.default_heating = Some(label.into());
        self
    }

    /// Enable or disable parallel row transformation.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }

    /// Set the number of rows processed between progress updates.
    pub fn chunk_size(mut self, rows: usize) -> Self {
        self.chunk_size = Some(rows);
        self
    }

    /// Set the output directory for the cleaned data and reports.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set a custom output file name (without extension).
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    /// Enable or disable saving the cleaned batch to disk.
    pub fn save_to_disk(mut self, save: bool) -> Self {
        self.save_to_disk = Some(save);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let config = PipelineConfig {
            income_floor: self.income_floor.unwrap_or(DEFAULT_INCOME_FLOOR),
            certificate_max_age: self
                .certificate_max_age
                .unwrap_or(DEFAULT_CERTIFICATE_MAX_AGE),
            reference_year: self.reference_year,
            default_heating: self
                .default_heating
                .unwrap_or_else(|| DEFAULT_HEATING.to_string()),
            parallel: self.parallel.unwrap_or(false),
            chunk_size: self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from("output")),
            output_name: self.output_name,
            save_to_disk: self.save_to_disk.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}
