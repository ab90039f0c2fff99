use crate::config::{DEFAULT_OUTPUT_NAME, PipelineConfig};
use crate::error::{Result, ResultExt};
use crate::types::{BatchSummary, DropReason};
use chrono::Local;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// ============================================================================
// Report Types
// ============================================================================

/// Report of one pipeline run, used for both `--json` output and
/// `--emit-report` files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input file
    pub input_file: String,
    /// Path to the cleaned CSV (if written)
    pub output_file: Option<String>,
    /// Settings that shaped the result
    pub settings: ReportSettings,
    /// Row counts and warnings
    pub summary: BatchSummary,
    /// One entry per drop reason, including reasons with no drops
    pub drops: Vec<DropCount>,
    /// Output column names in schema order
    pub columns: Vec<String>,
}

/// Configuration values echoed into the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    pub income_floor: i64,
    pub certificate_max_age: i32,
    pub reference_year: i32,
    pub default_heating: String,
    pub parallel: bool,
}

impl ReportSettings {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            income_floor: config.income_floor,
            certificate_max_age: config.certificate_max_age,
            reference_year: config.effective_reference_year(),
            default_heating: config.default_heating.clone(),
            parallel: config.parallel,
        }
    }
}

/// Excluded row count for one reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropCount {
    pub reason: DropReason,
    pub description: String,
    pub count: usize,
    /// Share of input rows, in percent
    pub percent: f32,
}

// ============================================================================
// Report Generator
// ============================================================================

/// Writes the cleaned CSV and JSON run reports.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    output_dir: PathBuf,
    output_name: Option<String>,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            output_name: None,
        }
    }
}

impl ReportGenerator {
    /// Create a new ReportGenerator with custom output settings.
    pub fn new(output_dir: PathBuf, output_name: Option<String>) -> Self {
        Self {
            output_dir,
            output_name,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path the cleaned CSV is written to.
    pub fn csv_path(&self) -> PathBuf {
        let stem = self.output_name.as_deref().unwrap_or(DEFAULT_OUTPUT_NAME);
        self.output_dir.join(format!("{}.csv", stem))
    }

    /// Write the cleaned batch as CSV with a header row.
    pub fn write_batch_csv(&self, df: &mut DataFrame) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).context(format!(
            "Failed to create output directory {}",
            self.output_dir.display()
        ))?;

        let output_path = self.csv_path();
        let mut file = File::create(&output_path)
            .context(format!("Failed to create {}", output_path.display()))?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(df)
            .context("Failed to write cleaned listings")?;

        info!("Dataset saved: {}", output_path.display());
        debug!("Wrote {} rows x {} columns", df.height(), df.width());

        Ok(output_path)
    }

    /// Build a run report from a finished pipeline run.
    pub fn build_report(
        input_file: &str,
        output_file: Option<&Path>,
        config: &PipelineConfig,
        summary: &BatchSummary,
        columns: &[&str],
    ) -> RunReport {
        let drops = DropReason::ALL
            .iter()
            .map(|reason| {
                let count = summary.dropped(*reason);
                let percent = if summary.rows_in == 0 {
                    0.0
                } else {
                    (count as f32 / summary.rows_in as f32) * 100.0
                };
                DropCount {
                    reason: *reason,
                    description: reason.display_name().to_string(),
                    count,
                    percent,
                }
            })
            .collect();

        RunReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.to_string(),
            output_file: output_file.map(|p| p.display().to_string()),
            settings: ReportSettings::from_config(config),
            summary: summary.clone(),
            drops,
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Write a run report to `<report_base_name>_report.json` in the output
    /// directory.
    pub fn write_report_to_file(
        &self,
        report: &RunReport,
        report_base_name: &str,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self
            .output_dir
            .join(format!("{}_report.json", report_base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "listing-processing-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_csv_path_uses_output_name() {
        let generator = ReportGenerator::new(PathBuf::from("out"), Some("listings".to_string()));
        assert_eq!(generator.csv_path(), PathBuf::from("out").join("listings.csv"));

        let generator = ReportGenerator::new(PathBuf::from("out"), None);
        assert_eq!(
            generator.csv_path(),
            PathBuf::from("out").join("cleaned_listings.csv")
        );
    }

    #[test]
    fn test_build_report_lists_every_reason() {
        let mut summary = BatchSummary::new();
        summary.rows_in = 4;
        summary.rows_retained = 3;
        summary.record_drop(DropReason::IncomeBelowFloor);

        let config = PipelineConfig::builder().reference_year(2024).build().unwrap();
        let report =
            ReportGenerator::build_report("in.csv", None, &config, &summary, &["price", "income"]);

        assert_eq!(report.drops.len(), DropReason::ALL.len());
        let income = report
            .drops
            .iter()
            .find(|d| d.reason == DropReason::IncomeBelowFloor)
            .unwrap();
        assert_eq!(income.count, 1);
        assert!((income.percent - 25.0).abs() < 0.01);
        assert_eq!(report.settings.reference_year, 2024);
        assert_eq!(report.columns, vec!["price", "income"]);
        assert!(report.output_file.is_none());
    }

    #[test]
    fn test_write_csv_and_report() {
        let dir = scratch_dir("generator");
        let generator = ReportGenerator::new(dir.clone(), Some("batch".to_string()));

        let mut df = df![
            "price" => [300_000i64, 415_000],
            "water_name" => [Some("Fleuve St-Laurent"), None],
        ]
        .unwrap();
        let csv_path = generator.write_batch_csv(&mut df).unwrap();
        let content = fs::read_to_string(&csv_path).unwrap();
        assert!(content.starts_with("price,water_name"));
        assert!(content.contains("300000,Fleuve St-Laurent"));

        let config = PipelineConfig::default();
        let report = ReportGenerator::build_report(
            "in.csv",
            Some(&csv_path),
            &config,
            &BatchSummary::new(),
            &[],
        );
        let report_path = generator.write_report_to_file(&report, "in").unwrap();
        assert!(report_path.ends_with("in_report.json"));

        let parsed: RunReport =
            serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(parsed.input_file, "in.csv");

        fs::remove_dir_all(&dir).ok();
    }
}
