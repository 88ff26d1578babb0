//! CLI for Pixelbench
//!
//! Benchmarks pixel filters on the host against the same filters running
//! inside a WASM module:
//! - run: one filter
//! - suite: every filter
//! - info: inspect a filter module

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod image_source;
mod output;

#[derive(Parser)]
#[command(name = "pixelbench")]
#[command(about = "Pixelbench - host vs. WASM pixel filter benchmark", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Benchmark a single filter
    Run(commands::run::RunArgs),

    /// Benchmark every filter on the same image
    Suite(commands::suite::SuiteArgs),

    /// Load a filter module and show its exports and memory
    Info(commands::info::InfoArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            init_tracing(args.common.verbose);
            commands::run::run(args)
        }
        Commands::Suite(args) => {
            init_tracing(args.common.verbose);
            commands::suite::run(args)
        }
        Commands::Info(args) => {
            init_tracing(args.verbose);
            commands::info::run(args)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
