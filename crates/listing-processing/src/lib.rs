//! Listing Normalization Pipeline Library
//!
//! Turns raw, human-formatted real-estate listings scraped from a Québec
//! portal into a typed, fixed-schema feature table, built with Rust and Polars.
//!
//! # Overview
//!
//! - **Field Parsers**: Currency, area, year, parking and certificate text into typed values
//! - **Category Normalizers**: Free text into canonical labels and indicator flags
//! - **Record Transformer**: One raw listing into one cleaned listing or a drop reason
//! - **Batch Pipeline**: Schema validation, ordered transformation and drop accounting
//! - **Progress Reporting**: Real-time progress updates with cancellation support
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use listing_processing::{ingest, Pipeline, PipelineConfig};
//!
//! let df = ingest::load_listings("data/listings.csv")?;
//!
//! let config = PipelineConfig::builder()
//!     .reference_year(2024)
//!     .income_floor(2000)
//!     .build()?;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .build()?
//!     .process(df)?;
//!
//! println!(
//!     "Retained {} of {} listings",
//!     result.summary.rows_retained, result.summary.rows_in
//! );
//! ```
//!
//! # Progress Reporting
//!
//! ```rust,ignore
//! use listing_processing::{CancellationToken, ListingError, Pipeline};
//!
//! let token = CancellationToken::new();
//! let token_for_cancel = token.clone();
//!
//! std::thread::spawn(move || {
//!     std::thread::sleep(std::time::Duration::from_secs(10));
//!     token_for_cancel.cancel();
//! });
//!
//! let result = Pipeline::builder()
//!     .cancellation_token(token)
//!     .on_progress(|update| {
//!         println!("[{:?}] {}", update.stage, update.message);
//!     })
//!     .build()?
//!     .process(df);
//!
//! match result {
//!     Ok(result) => println!("Kept {} rows", result.summary.rows_retained),
//!     Err(ListingError::Cancelled) => println!("Cancelled by user"),
//!     Err(e) => println!("Error: {}", e),
//! }
//! ```

pub mod config;
pub mod error;
pub mod fields;
pub mod ingest;
pub mod normalizers;
pub mod parsers;
pub mod pipeline;
pub mod reporting;
pub mod transformer;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use error::{ListingError, Result as ListingResult, ResultExt};
pub use ingest::{load_listings, raw_listings, validate_schema};
pub use pipeline::{
    CancellationToken, ClosureProgressReporter, Pipeline, PipelineBuilder, PipelineStage,
    ProgressReporter, ProgressUpdate,
};
pub use reporting::{DropCount, ReportGenerator, ReportSettings, RunReport};
pub use transformer::ListingTransformer;
pub use types::{
    BatchSummary, CleanedListing, DropReason, FeatureBatch, FeatureKind, FeatureValue,
    PipelineResult, RawListing,
};
