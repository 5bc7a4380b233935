//! Stats command: size statistics over the flat table

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use nrp_report::{SizeStats, render_size_report};

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Flat Parquet table from `nrp harvest`
    #[arg(long)]
    pub parquet: PathBuf,

    /// Percentiles to report, in percent
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "10,25,50,75,90",
        value_parser = parse_percent
    )]
    pub percentiles: Vec<f64>,

    /// Write the Markdown report here instead of stdout
    #[arg(long)]
    pub out_md: Option<PathBuf>,
}

/// `"90"` → `0.9`
fn parse_percent(s: &str) -> Result<f64, String> {
    let pct: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("not a number: {s}"))?;
    if !(0.0..=100.0).contains(&pct) {
        return Err(format!("percentile out of range [0, 100]: {s}"));
    }
    Ok(pct / 100.0)
}

pub fn run(args: StatsArgs) -> Result<()> {
    let rows = nrp_harvest::read_flat_rows(&args.parquet)?;
    let Some(stats) = SizeStats::from_rows(&rows) else {
        anyhow::bail!(
            "No records with a known size in {}",
            args.parquet.display()
        );
    };
    stats.log();
    eprintln!("{}", stats.format_table(&args.percentiles));

    let md = render_size_report(&stats, &args.percentiles);
    match &args.out_md {
        Some(path) => {
            super::write_text(path, &md)?;
            log::info!("Wrote {}", path.display());
        }
        None => print!("{md}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: StatsArgs,
    }

    #[test]
    fn default_percentiles() {
        let cli = TestCli::parse_from(["nrp", "--parquet", "f.parquet"]);
        assert_eq!(cli.args.percentiles, vec![0.10, 0.25, 0.50, 0.75, 0.90]);
    }

    #[test]
    fn custom_percentiles() {
        let cli = TestCli::parse_from(["nrp", "--parquet", "f", "--percentiles", "50,99.5"]);
        assert_eq!(cli.args.percentiles, vec![0.5, 0.995]);
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(parse_percent("101").is_err());
        assert!(parse_percent("abc").is_err());
        assert_eq!(parse_percent("0"), Ok(0.0));
    }
}
