//! Communities command: per-community counts and newest records

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use nrp_core::{HttpConfig, HttpFetcher};
use nrp_harvest::communities::NEWEST;
use nrp_report::render_communities;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct CommunitiesArgs {
    /// Repository base URL (default from config)
    #[arg(long)]
    pub base: Option<String>,

    /// Write the Markdown table here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Newest records linked per community
    #[arg(long, default_value_t = NEWEST)]
    pub newest: usize,
}

pub fn run(args: CommunitiesArgs, config: &Config, http: &HttpConfig) -> Result<()> {
    let base = args
        .base
        .as_deref()
        .unwrap_or(&config.api.base_url)
        .trim_end_matches('/');

    let fetcher = HttpFetcher::new(http).context("Failed to build HTTP client")?;
    let listings = nrp_harvest::scan_communities(&fetcher, base, args.newest)
        .context("Failed to list communities")?;
    log::info!("Scanned {} communities", listings.len());

    let md = render_communities(&listings, base, args.newest);
    match &args.out {
        Some(path) => {
            super::write_text(path, &md)?;
            log::info!("Wrote {}", path.display());
        }
        None => print!("{md}"),
    }
    Ok(())
}
