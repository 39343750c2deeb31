//! dllist CLI - build and verify channel download lists.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dllist_executor::observability::{TracingConfig, TracingGuard, init_tracing};
use std::path::PathBuf;

/// dllist - download list generator.
#[derive(Parser)]
#[command(name = "dllist")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv); overrides DLLIST_LOG_LEVEL and RUST_LOG
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build lists for every target in the plan
    Build {
        /// Path to the catalog JSON file
        #[arg(short, long)]
        catalog: PathBuf,

        /// Path to a build plan YAML file (default plan if omitted)
        #[arg(short, long)]
        plan: Option<PathBuf>,

        /// Output directory (overrides DLLIST_OUTPUT_DIR)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum builds in flight (overrides DLLIST_MAX_CONCURRENT_BUILDS)
        #[arg(short = 'j', long)]
        max_concurrent: Option<usize>,
    },

    /// Decompress a stored list and check its size and checksum
    Verify {
        /// Path to a dllist.bin file
        file: PathBuf,
    },

    /// Show the targets a plan builds
    Targets {
        /// Path to a build plan YAML file (default plan if omitted)
        #[arg(short, long)]
        plan: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn setup_logging(verbosity: u8) -> Result<TracingGuard> {
    init_tracing(TracingConfig::from_env().with_verbosity(verbosity))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let _tracing_guard = match setup_logging(cli.verbose) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    };

    let result = match cli.command {
        Commands::Build {
            catalog,
            plan,
            output,
            max_concurrent,
        } => {
            commands::build::run(commands::build::BuildArgs {
                catalog,
                plan,
                output,
                max_concurrent,
            })
            .await
        }
        Commands::Verify { file } => commands::verify::run(&file).await,
        Commands::Targets { plan } => commands::targets::run(plan.as_deref()),
        Commands::Version => commands::version::run(),
    };

    if let Err(e) = result {
        tracing::error!(error = %format!("{:#}", e), "Command failed");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
