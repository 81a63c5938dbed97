//! CLI entry point for dataset analysis.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tabular_insight::{AnalysisConfig, Dataset, analyze_dataset, load_dataset, sample_dataset};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Semantic type inference and statistical profiling for CSV datasets",
    long_about = "Profiles every column of a CSV file, infers its semantic type and \
                  writes a JSON analysis report.\n\n\
                  EXAMPLES:\n  \
                  # Report to stdout\n  \
                  tabular-insight -i data.csv\n\n  \
                  # Group numeric statistics by a column, pretty-printed to a file\n  \
                  tabular-insight -i data.csv --group-by department -o report.json --pretty\n\n  \
                  # Analyze the built-in demo table\n  \
                  tabular-insight --demo --pretty"
)]
struct Args {
    /// Path to the CSV file to analyze
    #[arg(short, long, required_unless_present = "demo")]
    input: Option<String>,

    /// Analyze the built-in employee table instead of a file
    ///
    /// Groups by "department" unless --group-by is given
    #[arg(long, conflicts_with = "input")]
    demo: bool,

    /// Column to group numeric statistics by
    #[arg(short, long)]
    group_by: Option<String>,

    /// Number of values sampled per column for type inference
    #[arg(long, default_value = "100")]
    sample_size: usize,

    /// Seed for the type-inference sampler
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Write the JSON report to this file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When the report goes to stdout, logging is disabled so stdout only
/// carries JSON.
fn init_logging(level: &str, quiet: bool, json_to_stdout: bool) {
    if json_to_stdout {
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

    init_logging(&args.log_level, args.quiet, args.output.is_none());

    let dataset = load_input(&args)?;

    let mut config_builder = AnalysisConfig::builder()
        .sample_size(args.sample_size)
        .sample_seed(args.seed);

    let group_by = args
        .group_by
        .clone()
        .or_else(|| args.demo.then(|| "department".to_string()));
    if let Some(column) = group_by {
        config_builder = config_builder.group_by_column(column);
    }

    let config = config_builder.build()?;
    let report = analyze_dataset(&dataset, &config)?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };

    match &args.output {
        Some(path) => {
            write_report(path, &json)?;
            info!("Report written to: {}", path);
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn load_input(args: &Args) -> Result<Dataset> {
    if args.demo {
        info!("Using built-in demo dataset");
        return Ok(sample_dataset()?);
    }

    let input = args
        .input
        .as_deref()
        .ok_or_else(|| anyhow!("--input is required unless --demo is set"))?;
    if !Path::new(input).exists() {
        return Err(anyhow!("Input file not found: {}", input));
    }

    info!("Loading dataset from: {}", input);
    let dataset = load_dataset(input).with_context(|| format!("Failed to load {input}"))?;
    info!(
        "Dataset loaded successfully: {} rows x {} columns",
        dataset.height(),
        dataset.width()
    );
    Ok(dataset)
}

fn write_report(path: &str, json: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
        info!("Created output directory: {}", parent.display());
    }

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
