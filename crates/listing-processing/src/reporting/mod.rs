//! Report generation module.
//!
//! This module writes the cleaned listing table and the JSON run report.
//!
//! # Example
//!
//! ```rust,ignore
//! use listing_processing::reporting::ReportGenerator;
//!
//! let report = ReportGenerator::build_report(
//!     "data/listings.csv",
//!     result.output_path.as_deref(),
//!     &config,
//!     &result.summary,
//!     &result.batch.column_names(),
//! );
//!
//! // Print as JSON
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! // Or write to file
//! let generator = ReportGenerator::new(PathBuf::from("output"), None);
//! generator.write_report_to_file(&report, "listings")?;
//! ```

mod generator;

pub use generator::{DropCount, ReportGenerator, ReportSettings, RunReport};
