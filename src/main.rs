use clap::Parser;
use drafts_export::sequential;
use drafts_export::utils::ExportConfig;
use eyre::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

/// Exit status when the export finished but some files could not be written.
const EXIT_PARTIAL: u8 = 2;

/// Convert a Drafts JSON export into Markdown files with YAML frontmatter.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the Drafts export (DraftsExport.json).
    #[arg(value_name = "INPUT_FILE")]
    input: PathBuf,

    /// Directory to write markdown files into. Created if missing.
    #[arg(value_name = "OUTPUT_DIR")]
    target_dir: PathBuf,

    /// Print each file written.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress standard output (progress bar and summary).
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // RUST_LOG overrides the verbosity flags
    let level = if cli.verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = ExportConfig {
        input_path: cli.input,
        target_dir: cli.target_dir,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let summary = sequential::execute(&config)?;

    if summary.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_PARTIAL))
    }
}
