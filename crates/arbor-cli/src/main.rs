//! Arbor CLI - Command-line interface for reinforcement simulations.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "arbor")]
#[command(author, version, about = "Arbor - Reinforced preferential attachment on layered lattices", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new Arbor project
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Run a simulation and save the run file
    Run {
        /// Number of rounds (overrides arbor.toml)
        #[arg(short, long)]
        rounds: Option<u64>,

        /// Random seed (overrides arbor.toml)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Run file to write (default: .arbor/run.json)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show statistics of a saved run
    Stats {
        /// Run file to read (default: .arbor/run.json)
        #[arg(short, long)]
        input: Option<String>,

        /// Visibility threshold (overrides arbor.toml)
        #[arg(short, long)]
        threshold: Option<u64>,
    },

    /// Export visible edges and node markers of one round
    Export {
        /// Output file path
        output: String,

        /// Run file to read (default: .arbor/run.json)
        #[arg(short, long)]
        input: Option<String>,

        /// Round to export (default: last)
        #[arg(short, long)]
        round: Option<u64>,

        /// Visibility threshold (overrides arbor.toml)
        #[arg(short, long)]
        threshold: Option<u64>,

        /// Export format
        #[arg(short, long, default_value = "json")]
        format: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Run { rounds, seed, output } => {
            commands::run::run(rounds, seed, output.as_deref(), cli.verbose)
        }
        Commands::Stats { input, threshold } => commands::stats::run(input.as_deref(), threshold),
        Commands::Export {
            output,
            input,
            round,
            threshold,
            format,
        } => commands::export::run(&output, input.as_deref(), round, threshold, &format),
    }
}
