//! Heaplink CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use heaplink_core::CoreError;

mod commands;

#[derive(Parser)]
#[command(name = "heaplink")]
#[command(about = "Causal linkage analysis between two heap snapshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two heap snapshots and link differences to code changes
    Compare {
        /// Path to the baseline runtime JSON file
        #[arg(long)]
        baseline: PathBuf,

        /// Path to the modified runtime JSON file
        #[arg(long)]
        modified: PathBuf,

        /// Path to the settings JSON file
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Path to the code evolution JSON file
        #[arg(long)]
        code_evolution: Option<PathBuf>,

        /// Path to save the comparison result (JSON); stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,

        /// Prefix for the HTML report files
        #[arg(long)]
        output_report: Option<PathBuf>,
    },
    /// Show version
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "heaplink={}",
            log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let result = match cli.command {
        Commands::Compare {
            baseline,
            modified,
            settings,
            code_evolution,
            output,
            output_report,
        } => commands::compare(
            baseline,
            modified,
            settings,
            code_evolution,
            output,
            output_report,
        ),
        Commands::Version => {
            println!("heaplink v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::from(exit_code_for(&error))
        }
    }
}

/// Distinct exit codes per failure kind: file not found (2), parse failure
/// (3), invalid runtime (4), unsupported strategy (5), anything else (1).
fn exit_code_for(error: &anyhow::Error) -> u8 {
    if let Some(core) = error.downcast_ref::<CoreError>() {
        return match core {
            CoreError::Parse(_) => 3,
            CoreError::InvalidRuntime(_) => 4,
            CoreError::UnsupportedStrategy(_) => 5,
        };
    }
    if let Some(io) = error.downcast_ref::<std::io::Error>() {
        if io.kind() == std::io::ErrorKind::NotFound {
            return 2;
        }
    }
    1
}
