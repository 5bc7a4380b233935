//! Top command: largest datasets with detail metadata

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use nrp_core::{HttpConfig, HttpFetcher, ProgressContext};
use nrp_report::top::DEFAULT_TOP;
use nrp_report::{enrich_top, index_raw, select_top};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct TopArgs {
    /// Flat Parquet table from `nrp harvest`
    #[arg(long)]
    pub parquet: PathBuf,

    /// Raw NDJSON dump from `nrp harvest`
    #[arg(long)]
    pub raw: PathBuf,

    /// Output directory
    #[arg(short, long)]
    pub out: PathBuf,

    /// How many datasets to report
    #[arg(short, default_value_t = DEFAULT_TOP)]
    pub n: usize,

    /// Repository base URL (default from config)
    #[arg(long)]
    pub base: Option<String>,
}

pub fn run(
    args: TopArgs,
    config: &Config,
    http: &HttpConfig,
    progress: &ProgressContext,
) -> Result<()> {
    let base = args.base.as_deref().unwrap_or(&config.api.base_url);

    let rows = nrp_harvest::read_flat_rows(&args.parquet)?;
    let top = select_top(&rows, args.n);
    anyhow::ensure!(
        !top.is_empty(),
        "No records with a known size in {}",
        args.parquet.display()
    );
    let raw = index_raw(nrp_harvest::read_raw_records(&args.raw)?);

    let fetcher = HttpFetcher::new(http).context("Failed to build HTTP client")?;
    let report = enrich_top(&fetcher, &top, &raw, base, progress);
    let written = report.write_all(&args.out)?;

    for path in &written {
        log::info!("Wrote {}", path.display());
    }
    print!("{}", report.to_markdown());
    Ok(())
}
