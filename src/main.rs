//! CLI entry point for the grade rater.
//!
//! Provides subcommands for producing a full grade report, filling gaps in a
//! gradebook without grading, and listing reference-dataset averages.

use anyhow::Result;
use clap::{Parser, Subcommand};
use grade_rater::analyzers::analyzer::{RunPaths, analyze, fill, load_averages};
use grade_rater::config::{FillStrategy, GradingConfig};
use grade_rater::output::{print_json, print_summary, render_averages};
use grade_rater::schema::Layout;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "grade_rater")]
#[command(about = "Fills a CSV gradebook and computes the final grade", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill empty cells, compute every score and write the annotated gradebook
    Report {
        /// Gradebook to read
        #[arg(short, long, default_value = "grades.csv")]
        input: PathBuf,

        /// Where to write the filled, annotated gradebook
        #[arg(short, long, default_value = "grades_filled.csv")]
        output: PathBuf,

        /// Reference dataset whose column averages fill empty cells
        #[arg(short, long, default_value = "reference.csv")]
        reference: PathBuf,

        /// Optional JSON grading config (weights, fill defaults)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Also log the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Fill empty cells and write the gradebook without computing scores
    Fill {
        #[arg(short, long, default_value = "grades.csv")]
        input: PathBuf,

        #[arg(short, long, default_value = "grades_filled.csv")]
        output: PathBuf,

        #[arg(short, long, default_value = "reference.csv")]
        reference: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the per-column averages of the reference dataset
    Averages {
        #[arg(short, long, default_value = "reference.csv")]
        reference: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/grade_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("grade_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let layout = Layout::standard();

    match cli.command {
        Commands::Report {
            input,
            output,
            reference,
            config,
            json,
        } => {
            let config = GradingConfig::load_or_default(config.as_deref())?;
            let paths = RunPaths {
                input: &input,
                output: &output,
                reference: &reference,
            };

            let run = analyze(&paths, &config, &layout)?;

            print_summary(&run.report);
            if json {
                print_json(&run.report)?;
            }
        }
        Commands::Fill {
            input,
            output,
            reference,
            config,
        } => {
            let config = GradingConfig::load_or_default(config.as_deref())?;
            let paths = RunPaths {
                input: &input,
                output: &output,
                reference: &reference,
            };

            let fills = fill(&paths, &config, &layout)?;
            info!(
                filled_cells = fills.len(),
                output = %output.display(),
                "Filled gradebook written"
            );
        }
        Commands::Averages { reference, config } => {
            let mut config = GradingConfig::load_or_default(config.as_deref())?;
            config.fill.strategy = FillStrategy::Reference;

            if let Some(averages) = load_averages(&reference, &config)? {
                print!("{}", render_averages(&averages));
            }
        }
    }

    Ok(())
}
