//! Histogram command: log-scale bins and CDF as CSV and Markdown

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use nrp_report::histogram::{DEFAULT_BINS, write_cdf_csv};
use nrp_report::{LogHistogram, SizeStats, cdf_points, positive_gib, render_distribution_summary};

const BINS_CSV: &str = "size_histogram.csv";
const BINS_MD: &str = "size_histogram.md";
const CDF_CSV: &str = "cumulative_distribution.csv";

#[derive(Args, Debug)]
pub struct HistogramArgs {
    /// Flat Parquet table from `nrp harvest`
    #[arg(long)]
    pub parquet: PathBuf,

    /// Output directory
    #[arg(short, long)]
    pub out: PathBuf,

    /// Number of geometric bins
    #[arg(long, default_value_t = DEFAULT_BINS)]
    pub bins: usize,
}

pub fn run(args: HistogramArgs) -> Result<()> {
    anyhow::ensure!(args.bins > 0, "--bins must be at least 1");

    let rows = nrp_harvest::read_flat_rows(&args.parquet)?;
    let bytes: Vec<f64> = rows.iter().filter_map(|r| r.bytes_total).map(|b| b as f64).collect();
    let sizes_gb = positive_gib(bytes.iter().copied());
    let Some(hist) = LogHistogram::build(&sizes_gb, args.bins) else {
        anyhow::bail!(
            "No records with a positive size in {}",
            args.parquet.display()
        );
    };

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("Cannot create {}", args.out.display()))?;

    let csv_path = args.out.join(BINS_CSV);
    let file = std::fs::File::create(&csv_path)
        .with_context(|| format!("Cannot create {}", csv_path.display()))?;
    hist.write_csv(file)?;

    let mut md = String::from("## Dataset size distribution\n\n");
    if let Some(stats) = SizeStats::compute(bytes) {
        md.push_str(&render_distribution_summary(&stats));
        md.push('\n');
    }
    md.push_str(&hist.to_markdown());
    let md_path = args.out.join(BINS_MD);
    super::write_text(&md_path, &md)?;

    let cdf_path = args.out.join(CDF_CSV);
    write_cdf_csv(&cdf_path, &cdf_points(&sizes_gb))?;

    log::info!(
        "Histogram: {} datasets in {} bins → {}",
        nrp_core::fmt_num(hist.total() as usize),
        hist.counts.len(),
        args.out.display()
    );
    Ok(())
}
