//! nrp - Harvest and report on the National Repository (NRP) datasets
//!
//! Pages through the dataset listing, resolves record sizes, writes a raw
//! NDJSON dump plus a flat Parquet table, and builds size, top-N and
//! community reports from them.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "nrp")]
#[command(about = "Harvest and report on NRP research datasets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./nrp.toml or ~/.config/nrp/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Retries after the first attempt for transient failures (429 and 5xx)
    #[arg(long, global = true)]
    max_retries: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Harvest the listing into NDJSON, flat Parquet and DuckDB
    Harvest(cmd::harvest::HarvestArgs),
    /// Size statistics over the flat table
    Stats(cmd::stats::StatsArgs),
    /// Log-scale size histogram and cumulative distribution
    Histogram(cmd::histogram::HistogramArgs),
    /// Largest datasets enriched with detail metadata
    Top(cmd::top::TopArgs),
    /// Communities with record counts and newest records
    Communities(cmd::communities::CommunitiesArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress = Arc::new(nrp_core::ProgressContext::new());

    // TTY: quiet unless --debug, spinners show activity
    // non-TTY: info, logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    nrp_core::init_logging(quiet, cli.debug, multi);

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    let http_config =
        config
            .http
            .http_config(cli.timeout, cli.max_retries, config.api.token.clone());

    match cli.command {
        Command::Harvest(args) => cmd::harvest::run(args, &config, &http_config, &progress),
        Command::Stats(args) => cmd::stats::run(args),
        Command::Histogram(args) => cmd::histogram::run(args),
        Command::Top(args) => cmd::top::run(args, &config, &http_config, &progress),
        Command::Communities(args) => cmd::communities::run(args, &config, &http_config),
        Command::Config => {
            let mut table = cmd::key_value_table();
            table.add_row(vec!["Base URL", &config.api.base_url]);
            table.add_row(vec!["Listing URL", &config.api.listing_url()]);
            table.add_row(vec![
                "API token",
                if http_config.token.is_some() {
                    "configured"
                } else {
                    "not set"
                },
            ]);
            table.add_row(vec![
                "Timeout",
                &format!("{}s", http_config.timeout.as_secs()),
            ]);
            table.add_row(vec![
                "Max retries",
                &http_config.retry.max_attempts.saturating_sub(1).to_string(),
            ]);
            table.add_row(vec![
                "Output directory",
                &config.output.default_dir.display().to_string(),
            ]);
            table.add_row(vec![
                "Compression level",
                &config.output.compression_level.to_string(),
            ]);
            table.add_row(vec!["Page size", &config.harvest.page_size.to_string()]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
