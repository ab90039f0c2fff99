//! Main listing pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating schema validation, per-row transformation and batch
//! assembly.

use crate::config::PipelineConfig;
use crate::error::{ListingError, Result};
use crate::ingest::{raw_listings, validate_schema};
use crate::pipeline::progress::{
    CancellationToken, ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::reporting::ReportGenerator;
use crate::transformer::ListingTransformer;
use crate::types::{BatchSummary, CleanedListing, DropReason, FeatureBatch, PipelineResult, RawListing};
use polars::prelude::*;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Share of dropped rows above which a run is flagged as lossy.
const HIGH_DROP_PERCENT: f32 = 30.0;

/// The listing normalization pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use listing_processing::{Pipeline, PipelineConfig, CancellationToken};
///
/// let token = CancellationToken::new();
///
/// let result = Pipeline::builder()
///     .config(PipelineConfig::builder().parallel(true).build()?)
///     .cancellation_token(token.clone())
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .process(dataframe)?;
///
/// println!("kept {} of {}", result.summary.rows_retained, result.summary.rows_in);
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cancellation_token: CancellationToken,
    transformer: ListingTransformer,
    reporter: ReportGenerator,
}

static_assertions::assert_impl_all!(Pipeline: Send, Sync);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process a raw listing table.
    ///
    /// Every column is read as text regardless of its dtype. Rows failing
    /// mandatory validation are dropped and counted; they never fail the run.
    ///
    /// # Errors
    ///
    /// - [`ListingError::MissingColumns`] when expected raw columns are absent
    /// - [`ListingError::Cancelled`] when the cancellation token fires
    /// - I/O or polars errors while assembling or writing the output
    pub fn process(&self, df: DataFrame) -> Result<PipelineResult> {
        self.report_starting(df.height());
        self.finish(self.process_internal(df))
    }

    /// Process listings that are already split into records.
    ///
    /// No schema check is done; absent fields behave as empty values.
    pub fn process_listings(&self, listings: &[RawListing]) -> Result<PipelineResult> {
        let start_time = Instant::now();
        self.report_starting(listings.len());
        self.finish(self.run(listings, start_time))
    }

    fn report_starting(&self, rows: usize) {
        info!("Starting listing pipeline on {} row(s)...", rows);
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Initializing,
            0.0,
            "Starting listing pipeline...",
        ));
    }

    fn finish(&self, result: Result<PipelineResult>) -> Result<PipelineResult> {
        match result {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(result)
            }
            Err(e) => {
                if e.is_cancelled() {
                    self.report_progress(ProgressUpdate::cancelled());
                } else {
                    self.report_progress(ProgressUpdate::failed(e.to_string()));
                }
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Check if cancellation has been requested.
    fn check_cancelled(&self) -> Result<()> {
        if self.cancellation_token.is_cancelled() {
            return Err(ListingError::Cancelled);
        }
        Ok(())
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn process_internal(&self, df: DataFrame) -> Result<PipelineResult> {
        let start_time = Instant::now();

        self.report_progress(ProgressUpdate::new(
            PipelineStage::SchemaValidation,
            0.0,
            format!("Validating {} input column(s)...", df.width()),
        ));
        info!("Step 1: Validating input schema...");
        validate_schema(&df)?;
        debug!("Input schema carries every expected column");

        let listings = raw_listings(&df)?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::SchemaValidation,
            1.0,
            "Schema validated",
        ));

        self.run(&listings, start_time)
    }

    fn run(&self, listings: &[RawListing], start_time: Instant) -> Result<PipelineResult> {
        debug!(
            "Reference year {}, income floor {}",
            self.transformer.reference_year(),
            self.config.income_floor
        );

        let mut summary = BatchSummary::new();
        summary.rows_in = listings.len();

        self.check_cancelled()?;

        // Step 2: Transform every row
        info!("Step 2: Transforming listings...");
        let rows = self.transform_rows(listings, &mut summary)?;

        self.check_cancelled()?;

        // Step 3: Assemble the typed table
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Assembling,
            0.0,
            "Assembling feature batch...",
        ));
        info!("Step 3: Assembling feature batch...");
        let batch = FeatureBatch::new(rows);
        let mut dataframe = batch.to_dataframe()?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Assembling,
            1.0,
            format!("Assembled {} x {} table", dataframe.height(), dataframe.width()),
        ));

        self.check_cancelled()?;

        // Step 4: Persist
        let output_path = if self.config.save_to_disk {
            self.report_progress(ProgressUpdate::new(
                PipelineStage::Writing,
                0.0,
                "Writing cleaned listings...",
            ));
            info!("Step 4: Writing cleaned listings...");
            let path = self.reporter.write_batch_csv(&mut dataframe)?;
            self.report_progress(ProgressUpdate::new(
                PipelineStage::Writing,
                1.0,
                "Output file saved",
            ));
            Some(path)
        } else {
            info!("Step 4: Skipping output file (save_to_disk disabled)");
            None
        };

        // Finalize summary
        summary.rows_retained = batch.len();
        summary.columns_out = dataframe.width();
        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        for reason in DropReason::ALL {
            let count = summary.dropped(reason);
            if count > 0 {
                debug!("Dropped {} row(s): {}", count, reason);
            }
        }

        if summary.rows_dropped_percentage() > HIGH_DROP_PERCENT {
            let message = format!(
                "High data loss: {:.1}% of rows were dropped",
                summary.rows_dropped_percentage()
            );
            warn!("{}", message);
            summary.add_warning(message);
        }

        info!(
            "Retained {} of {} listing(s) in {}ms",
            summary.rows_retained, summary.rows_in, summary.duration_ms
        );

        Ok(PipelineResult {
            batch,
            dataframe,
            summary,
            output_path,
        })
    }

    /// Transform rows chunk by chunk, checking for cancellation between
    /// chunks. Output keeps input order in both sequential and parallel mode.
    fn transform_rows(
        &self,
        listings: &[RawListing],
        summary: &mut BatchSummary,
    ) -> Result<Vec<CleanedListing>> {
        let total = listings.len();
        let chunk_count = total.div_ceil(self.config.chunk_size);
        let transformer = &self.transformer;
        let mut retained = Vec::with_capacity(total);
        let mut processed = 0usize;

        if self.config.parallel {
            debug!("Transforming on {} rayon thread(s)", rayon::current_num_threads());
        }

        for (chunk_index, chunk) in listings.chunks(self.config.chunk_size).enumerate() {
            self.check_cancelled()?;

            let outcomes: Vec<std::result::Result<CleanedListing, DropReason>> =
                if self.config.parallel {
                    chunk.par_iter().map(|raw| transformer.transform(raw)).collect()
                } else {
                    chunk.iter().map(|raw| transformer.transform(raw)).collect()
                };

            for (offset, outcome) in outcomes.into_iter().enumerate() {
                match outcome {
                    Ok(listing) => retained.push(listing),
                    Err(reason) => {
                        debug!("Row {} dropped: {}", processed + offset, reason);
                        summary.record_drop(reason);
                    }
                }
            }

            processed += chunk.len();
            self.report_progress(ProgressUpdate::with_items(
                PipelineStage::Transforming,
                format!("Chunk {}/{}", chunk_index + 1, chunk_count),
                processed,
                total,
                format!("Transformed {} of {} listings", processed, total),
            ));
        }

        Ok(retained)
    }
}

/// Builder for creating a [`Pipeline`] instance.
///
/// Use [`Pipeline::builder()`] to get started.
///
/// # Example
///
/// ```rust,ignore
/// use listing_processing::{Pipeline, PipelineConfig, CancellationToken};
///
/// let token = CancellationToken::new();
///
/// let pipeline = Pipeline::builder()
///     .config(PipelineConfig::default())
///     .cancellation_token(token)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?;
/// ```
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cancellation_token: Option<CancellationToken>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use listing_processing::{ProgressReporter, ProgressUpdate};
    /// use std::sync::Arc;
    ///
    /// struct MyReporter;
    ///
    /// impl ProgressReporter for MyReporter {
    ///     fn report(&self, update: ProgressUpdate) {
    ///         println!("{}: {}", update.stage.display_name(), update.message);
    ///     }
    /// }
    ///
    /// let pipeline = Pipeline::builder()
    ///     .progress_reporter(Arc::new(MyReporter))
    ///     .build()?;
    /// ```
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Set a cancellation token for stopping the pipeline.
    ///
    /// Clone the token and call [`CancellationToken::cancel()`] from
    /// any thread. The pipeline returns [`ListingError::Cancelled`] at the
    /// next chunk boundary.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, crate::config::ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let reporter = ReportGenerator::new(config.output_dir.clone(), config.output_name.clone());
        let transformer = ListingTransformer::new(&config);

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
            cancellation_token: self.cancellation_token.unwrap_or_default(),
            transformer,
            reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn in_memory_config() -> PipelineConfig {
        PipelineConfig::builder()
            .reference_year(2024)
            .save_to_disk(false)
            .chunk_size(2)
            .build()
            .unwrap()
    }

    fn listing(income: &str, year_built: Option<&str>) -> RawListing {
        let mut pairs = vec![
            ("Rev. brut. pot.", income.to_string()),
            ("Superficie habitable", "1000".to_string()),
            ("Superficie du terrain", "2000".to_string()),
        ];
        if let Some(year) = year_built {
            pairs.push(("YearBuilt", year.to_string()));
        }
        RawListing::from_pairs(pairs)
    }

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert!(pipeline.config.save_to_disk);
        assert!(!pipeline.config.parallel);
    }

    #[test]
    fn test_pipeline_builder_rejects_invalid_config() {
        let config = PipelineConfig {
            chunk_size: 0,
            ..PipelineConfig::default()
        };
        assert!(Pipeline::builder().config(config).build().is_err());
    }

    #[test]
    fn test_pipeline_builder_with_cancellation_token() {
        let token = CancellationToken::new();
        let token_clone = token.clone();

        let pipeline = Pipeline::builder()
            .cancellation_token(token)
            .build()
            .unwrap();

        assert!(!pipeline.cancellation_token.is_cancelled());
        token_clone.cancel();
        assert!(pipeline.cancellation_token.is_cancelled());
    }

    #[test]
    fn test_check_cancelled() {
        let token = CancellationToken::new();

        let pipeline = Pipeline::builder()
            .cancellation_token(token.clone())
            .build()
            .unwrap();

        assert!(pipeline.check_cancelled().is_ok());

        token.cancel();
        let result = pipeline.check_cancelled();
        assert!(matches!(result.unwrap_err(), ListingError::Cancelled));
    }

    #[test]
    fn test_process_listings_counts_drops() {
        let pipeline = Pipeline::builder()
            .config(in_memory_config())
            .build()
            .unwrap();

        let listings = vec![
            listing("5000", Some("1990")),
            listing("1500", Some("1990")),
            listing("5000", None),
            listing("6000", Some("2001")),
            listing("7000", Some("2010")),
        ];
        let result = pipeline.process_listings(&listings).unwrap();

        assert_eq!(result.summary.rows_in, 5);
        assert_eq!(result.summary.rows_retained, 3);
        assert_eq!(result.summary.dropped(DropReason::IncomeBelowFloor), 1);
        assert_eq!(result.summary.dropped(DropReason::MissingYearBuilt), 1);
        assert_eq!(result.dataframe.height(), 3);
        assert!(result.output_path.is_none());
        assert!(result.summary.warnings.is_empty());

        let incomes: Vec<i64> = result.batch.rows().iter().map(|r| r.income).collect();
        assert_eq!(incomes, vec![5000, 6000, 7000]);
    }

    #[test]
    fn test_high_drop_rate_warns() {
        let pipeline = Pipeline::builder()
            .config(in_memory_config())
            .build()
            .unwrap();

        let listings = vec![listing("100", Some("1990")), listing("5000", Some("1990"))];
        let result = pipeline.process_listings(&listings).unwrap();
        assert_eq!(result.summary.warnings.len(), 1);
        assert!(result.summary.warnings[0].contains("50.0%"));
    }

    #[test]
    fn test_progress_is_reported_per_chunk() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let stages_clone = stages.clone();

        let pipeline = Pipeline::builder()
            .config(in_memory_config())
            .on_progress(move |update| {
                stages_clone.lock().unwrap().push(update.stage);
            })
            .build()
            .unwrap();

        let listings: Vec<RawListing> =
            (0..5).map(|_| listing("5000", Some("1990"))).collect();
        pipeline.process_listings(&listings).unwrap();

        let stages = stages.lock().unwrap();
        let transforming = stages
            .iter()
            .filter(|s| **s == PipelineStage::Transforming)
            .count();
        assert_eq!(transforming, 3);
        assert_eq!(stages.last(), Some(&PipelineStage::Complete));
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();

        let pipeline = Pipeline::builder()
            .config(in_memory_config())
            .cancellation_token(token)
            .on_progress(move |update| {
                if update.stage == PipelineStage::Cancelled {
                    calls_clone.fetch_add(1, Ordering::SeqCst);
                }
            })
            .build()
            .unwrap();

        let err = pipeline
            .process_listings(&[listing("5000", Some("1990"))])
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_process_rejects_missing_columns() {
        let pipeline = Pipeline::builder()
            .config(in_memory_config())
            .build()
            .unwrap();
        let df = df!["Prix" => ["300 000 $"]].unwrap();

        let err = pipeline.process(df).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_COLUMNS");
    }
}
