//! Harvest command: listing → NDJSON → flat Parquet → DuckDB

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use nrp_core::{HttpConfig, HttpFetcher, ProgressContext};
use nrp_harvest::HarvestConfig;

use crate::config::Config;

/// Database file written next to the Parquet table
const DUCKDB_FILE: &str = "nrp.duckdb";

#[derive(Args, Debug)]
pub struct HarvestArgs {
    /// Output directory (default from config)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Listing URL to start from (default: <base_url>/datasets/all/)
    #[arg(long)]
    pub url: Option<String>,

    /// Page size hint for the first request; 0 sends none
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Stop after this many records
    #[arg(long)]
    pub max_records: Option<usize>,

    /// Bearer token (overrides config and NRP_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// Skip loading the flat table into DuckDB
    #[arg(long)]
    pub no_duckdb: bool,

    /// Zstd compression level for Parquet output
    #[arg(long)]
    pub zstd_level: Option<i32>,
}

impl HarvestArgs {
    fn harvest_config(&self, config: &Config) -> HarvestConfig {
        let page_size = self.page_size.unwrap_or(config.harvest.page_size);
        HarvestConfig {
            start_url: self
                .url
                .clone()
                .unwrap_or_else(|| config.api.listing_url()),
            output_dir: self
                .out
                .clone()
                .unwrap_or_else(|| config.output.default_dir.clone()),
            page_size: (page_size > 0).then_some(page_size),
            max_records: self.max_records,
            zstd_level: self.zstd_level.unwrap_or(config.output.compression_level),
        }
    }
}

pub fn run(
    args: HarvestArgs,
    config: &Config,
    http: &HttpConfig,
    progress: &ProgressContext,
) -> Result<()> {
    let harvest_config = args.harvest_config(config);

    let mut http = http.clone();
    if let Some(token) = args.token.clone() {
        http.token = Some(token);
    }
    let fetcher = HttpFetcher::new(&http).context("Failed to build HTTP client")?;

    let summary = nrp_harvest::run(&harvest_config, &fetcher, progress)?;
    summary.log();
    summary.print();

    if args.no_duckdb {
        log::info!("Skipping DuckDB load");
        return Ok(());
    }
    let db_path = harvest_config.output_dir.join(DUCKDB_FILE);
    let loaded = nrp_db::load_flat_table(&harvest_config.flat_path(), &db_path)?;

    let mut table = super::key_value_table();
    table.add_row(vec!["Database", &db_path.display().to_string()]);
    table.add_row(vec!["Rows", &nrp_core::fmt_num(loaded.rows as usize)]);
    table.add_row(vec![
        "Rows with size",
        &nrp_core::fmt_num(loaded.with_sizes as usize),
    ]);
    table.add_row(vec!["Total bytes", &nrp_report::fmt_bytes(loaded.total_bytes as f64)]);
    eprintln!("\n{table}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: HarvestArgs,
    }

    #[test]
    fn defaults_come_from_config() {
        let cli = TestCli::parse_from(["nrp"]);
        let hc = cli.args.harvest_config(&Config::default());
        assert_eq!(hc.start_url, "https://data.narodni-repozitar.cz/datasets/all/");
        assert_eq!(hc.output_dir, PathBuf::from("./nrp_dump"));
        assert_eq!(hc.page_size, Some(100));
        assert_eq!(hc.max_records, None);
        assert_eq!(hc.zstd_level, 3);
    }

    #[test]
    fn flags_override_config() {
        let cli = TestCli::parse_from([
            "nrp",
            "--out",
            "/tmp/x",
            "--url",
            "https://repo.test/datasets/all/?q=a",
            "--page-size",
            "0",
            "--max-records",
            "7",
            "--zstd-level",
            "9",
            "--no-duckdb",
        ]);
        assert!(cli.args.no_duckdb);
        let hc = cli.args.harvest_config(&Config::default());
        assert_eq!(hc.output_dir, PathBuf::from("/tmp/x"));
        assert_eq!(hc.start_url, "https://repo.test/datasets/all/?q=a");
        assert_eq!(hc.page_size, None);
        assert_eq!(hc.max_records, Some(7));
        assert_eq!(hc.zstd_level, 9);
    }
}
