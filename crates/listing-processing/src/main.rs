//! CLI entry point for the listing normalization pipeline.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use dotenv::dotenv;
use listing_processing::{
    DropReason, ListingTransformer, Pipeline, PipelineConfig, PipelineResult, ReportGenerator,
    RunReport, ingest,
};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Real-estate listing normalization pipeline",
    long_about = "Turns scraped real-estate listings into a typed feature table.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  RUST_LOG    Overrides --log-level (may be set in a .env file)\n\n\
                  EXAMPLES:\n  \
                  # Basic usage\n  \
                  listing-processing -i listings.csv\n\n  \
                  # Pin the certificate reference year and write a report\n  \
                  listing-processing -i listings.csv --reference-year 2024 -r\n\n  \
                  # Preview drops without writing anything\n  \
                  listing-processing -i listings.json --dry-run"
)]
struct Args {
    /// Path to the CSV or JSON file to process
    #[arg(short, long)]
    input: String,

    /// Output directory for results
    #[arg(short, long, default_value = "./output")]
    output: String,

    /// Custom output file name (without extension)
    ///
    /// If not specified, uses "cleaned_listings"
    #[arg(long)]
    output_name: Option<String>,

    /// JSON file holding a pipeline configuration
    ///
    /// Command line flags override values from this file
    #[arg(long)]
    config: Option<String>,

    /// Drop listings whose gross potential income is below this value
    #[arg(long)]
    income_floor: Option<i64>,

    /// Year used as "now" when checking certificate age
    ///
    /// Defaults to the current calendar year
    #[arg(long)]
    reference_year: Option<i32>,

    /// Transform rows on all available cores
    #[arg(long)]
    parallel: bool,

    /// Validate the schema and preview drops without writing any file
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    /// Useful for piping to other tools: `... --json | jq .summary`
    #[arg(long)]
    json: bool,

    /// Write a detailed JSON report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load .env before the subscriber reads RUST_LOG
    dotenv().ok();

    init_logging(&args.log_level, args.quiet, args.json);

    info!("Loading listings from: {}", args.input);
    let data = ingest::load_listings(&args.input)?;
    info!("Listings loaded successfully: {:?}", data.shape());

    let config = build_config(&args)?;

    if args.dry_run {
        return run_dry_run(&args, config, &data);
    }

    let pipeline = build_pipeline(&args, config)?;
    run_pipeline(pipeline, &args, data)
}

/// Merge the optional config file with command line overrides.
fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path))?;
            let config: PipelineConfig = serde_json::from_str(&content)
                .with_context(|| format!("Invalid config file {}", path))?;
            debug!("Loaded configuration from {}", path);
            config
        }
        None => PipelineConfig::default(),
    };

    config.output_dir = PathBuf::from(&args.output);
    if let Some(name) = &args.output_name {
        config.output_name = Some(name.clone());
    }
    if let Some(floor) = args.income_floor {
        config.income_floor = floor;
    }
    if let Some(year) = args.reference_year {
        config.reference_year = Some(year);
    }
    if args.parallel {
        config.parallel = true;
    }
    if args.dry_run {
        config.save_to_disk = false;
    }

    config.validate()?;
    Ok(config)
}

fn build_pipeline(args: &Args, config: PipelineConfig) -> Result<Pipeline> {
    let mut builder = Pipeline::builder().config(config);

    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

/// Run dry-run mode: check the schema and count drops without writing files.
///
/// This uses `println!` intentionally; the preview is the point of the flag
/// and must show regardless of log level.
fn run_dry_run(args: &Args, config: PipelineConfig, data: &DataFrame) -> Result<()> {
    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Preview of listing normalization");
    println!("{}\n", "=".repeat(80));

    println!("INPUT OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {}", args.input);
    println!("  Rows: {}", data.height());
    println!("  Columns: {}", data.width());
    println!();

    println!("SCHEMA CHECK");
    println!("{}", "-".repeat(40));
    if let Err(e) = ingest::validate_schema(data) {
        match e.missing_columns() {
            Some(missing) => {
                println!("  Missing {} required column(s):", missing.len());
                for column in missing {
                    println!("    - {}", column);
                }
            }
            None => println!("  {}", e),
        }
        println!();
        println!("{}", "=".repeat(80));
        return Err(anyhow!("Input schema is incomplete"));
    }
    println!("  All required columns present");
    println!();

    let transformer = ListingTransformer::new(&config);
    let mut drops: BTreeMap<DropReason, usize> = BTreeMap::new();
    let listings = ingest::raw_listings(data)?;
    for listing in &listings {
        if let Err(reason) = transformer.transform(listing) {
            *drops.entry(reason).or_insert(0) += 1;
        }
    }
    let dropped: usize = drops.values().sum();

    println!("DROP PREVIEW");
    println!("{}", "-".repeat(40));
    println!("  Reference year: {}", transformer.reference_year());
    println!("  Income floor: {}", config.income_floor);
    for reason in DropReason::ALL {
        println!(
            "  {:<40} {}",
            reason.display_name(),
            drops.get(&reason).copied().unwrap_or(0)
        );
    }
    println!(
        "  Would retain {} of {} listing(s)",
        listings.len() - dropped,
        listings.len()
    );
    println!();

    println!("OUTPUT FILES (will be created)");
    println!("{}", "-".repeat(40));
    let generator = ReportGenerator::new(config.output_dir.clone(), config.output_name.clone());
    println!("  - {}", generator.csv_path().display());
    if args.emit_report {
        println!(
            "  - {}",
            config
                .output_dir
                .join(format!("{}_report.json", extract_file_stem(&args.input)))
                .display()
        );
    }
    println!();

    println!("{}", "=".repeat(80));
    println!("To write the cleaned listings, run without --dry-run");
    if !args.emit_report {
        println!("Add --emit-report to save a detailed JSON report");
    }
    println!("{}", "=".repeat(80));

    Ok(())
}

fn run_pipeline(pipeline: Pipeline, args: &Args, data: DataFrame) -> Result<()> {
    info!("{}", "=".repeat(80));
    info!("Starting listing normalization pipeline...");
    info!("{}", "=".repeat(80));

    let input_shape = data.shape();
    match pipeline.process(data) {
        Ok(result) => handle_pipeline_output(&pipeline, &result, input_shape, args),
        Err(e) => {
            error!("Pipeline failed: {}", e);
            Err(anyhow!("Pipeline failed: {}", e))
        }
    }
}

/// Handle pipeline output based on CLI flags.
///
/// - Default: print a human-readable summary to stdout
/// - `--json`: print the JSON report to stdout only (no logs)
/// - `--emit-report`: also write the JSON report to a file
fn handle_pipeline_output(
    pipeline: &Pipeline,
    result: &PipelineResult,
    input_shape: (usize, usize),
    args: &Args,
) -> Result<()> {
    let columns = result.batch.column_names();
    let report = ReportGenerator::build_report(
        &args.input,
        result.output_path.as_deref(),
        pipeline.config(),
        &result.summary,
        &columns,
    );

    if args.emit_report {
        let generator = ReportGenerator::new(pipeline.config().output_dir.clone(), None);
        let report_path =
            generator.write_report_to_file(&report, &extract_file_stem(&args.input))?;
        info!("Report written to: {}", report_path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_human_readable_summary(&report, input_shape);
    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("listings")
        .to_string()
}

fn print_human_readable_summary(report: &RunReport, input_shape: (usize, usize)) {
    let summary = &report.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("NORMALIZATION COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        report.input_file, input_shape.0, input_shape.1
    );
    match &report.output_file {
        Some(output_file) => println!(
            "Output: {} ({} rows x {} columns)",
            output_file, summary.rows_retained, summary.columns_out
        ),
        None => println!("Output: not written"),
    }
    println!();

    println!("Processing Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!("  Reference year: {}", report.settings.reference_year);
    println!(
        "  Rows: {} -> {} ({} dropped, {:.1}%)",
        summary.rows_in,
        summary.rows_retained,
        summary.rows_dropped(),
        summary.rows_dropped_percentage()
    );
    println!();

    let nonzero: Vec<_> = report.drops.iter().filter(|d| d.count > 0).collect();
    if !nonzero.is_empty() {
        println!("Dropped Rows:");
        for drop in nonzero {
            println!(
                "  - {}: {} ({:.1}%)",
                drop.description, drop.count, drop.percent
            );
        }
        println!();
    }

    if !summary.warnings.is_empty() {
        println!("Warnings:");
        for warning in &summary.warnings {
            println!("  - {}", warning);
        }
        println!();
    }

    println!("{}", "=".repeat(80));
}
