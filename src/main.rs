use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cchfix::{cli, logging};

#[derive(Parser)]
#[command(name = "cchfix")]
#[command(about = "Disposable carbon-clickhouse container for integration tests", long_about = None)]
#[command(version)]
struct Cli {
    /// Default log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Directory holding the tracked fixture record
    #[arg(long, global = true, default_value = ".cchfix")]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start carbon-clickhouse and print its address
    Up {
        /// Fixture config file (YAML)
        #[arg(short, long)]
        config: PathBuf,

        /// Base directory the config template path is relative to
        #[arg(long, default_value = ".")]
        test_dir: PathBuf,

        /// URL carbon-clickhouse uploads to
        #[arg(long, default_value = "http://clickhouse:8123")]
        clickhouse_url: String,

        /// Running ClickHouse container to link to
        #[arg(long, default_value = "clickhouse-server-gch-test")]
        clickhouse_container: String,
    },
    /// Stop and remove the tracked fixture
    Down {
        /// Stop the container but do not remove it
        #[arg(long)]
        keep: bool,

        /// Forget the record even when the container cannot be stopped
        #[arg(long, conflicts_with = "keep")]
        force: bool,
    },
    /// Show the tracked fixture
    Status,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init_tracing(&cli.log_level)?;

    match cli.command {
        Commands::Up {
            config,
            test_dir,
            clickhouse_url,
            clickhouse_container,
        } => cli::up::run(
            &config,
            &test_dir,
            &clickhouse_url,
            &clickhouse_container,
            &cli.state_dir,
        )
        .context("failed to start fixture")?,
        Commands::Down { keep, force } => cli::down::run(keep, force, &cli.state_dir)
            .context("failed to tear down fixture")?,
        Commands::Status => cli::status::run(&cli.state_dir)?,
    }

    Ok(())
}
