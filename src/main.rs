mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use mmi::config::MmiConfig;

#[derive(Parser)]
#[command(name = "mmi", version, about = "Massive Micro Ingestion for arbitrary payload trees")]
struct Cli {
    /// Config file (defaults to ~/.mmi/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest a JSON payload file and finalize the run
    Ingest {
        /// Path to a JSON file
        file: PathBuf,
        /// Payload name (defaults to the file stem)
        #[arg(long)]
        name: Option<String>,
        /// Walk referenced sources recursively
        #[arg(long)]
        recursive: bool,
        /// Recursion limit (overrides config)
        #[arg(long)]
        max_depth: Option<usize>,
        /// Print the full result as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// List the gaps in a JSON payload file without ingesting it
    Gaps {
        file: PathBuf,
        /// Payload name `ingest` would be given (defaults to the file stem)
        #[arg(long)]
        name: Option<String>,
        /// Preview fills as a recursive `ingest` would make them
        #[arg(long)]
        recursive: bool,
    },
    /// Show the cumulative manifest
    Stats,
    /// Ingest every text file under a directory
    Retro {
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MmiConfig::load_from(path)?,
        None => MmiConfig::load()?,
    };

    // Log to stderr so stdout stays clean for JSON output.
    let filter = EnvFilter::try_new(&config.logging.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Ingest {
            file,
            name,
            recursive,
            max_depth,
            json,
        } => {
            let opts = cli::ingest::IngestOptions {
                name,
                recursive,
                max_depth: max_depth.unwrap_or(config.ingestion.max_depth),
                json,
            };
            cli::ingest::ingest(&config, &file, &opts)?;
        }
        Command::Gaps {
            file,
            name,
            recursive,
        } => cli::gaps::gaps(&file, name.as_deref(), recursive)?,
        Command::Stats => cli::stats::stats(&config)?,
        Command::Retro { dir } => cli::retro::retro(&config, &dir)?,
    }

    Ok(())
}
