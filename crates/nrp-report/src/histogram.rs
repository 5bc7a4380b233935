//! Log-scale histogram bins and cumulative distribution of dataset sizes
//!
//! Sizes are binned in GiB. Only strictly positive sizes take part, since a
//! log axis has no place for zero.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::bytes::fmt_grouped;

pub const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Geometric bins between the observed min and max
pub const DEFAULT_BINS: usize = 49;

/// Equal-width bins used when every size is the same
const FLAT_BINS: usize = 10;

/// Bytes → GiB, keeping only strictly positive finite sizes
pub fn positive_gib(bytes: impl IntoIterator<Item = f64>) -> Vec<f64> {
    bytes
        .into_iter()
        .filter(|b| b.is_finite() && *b > 0.0)
        .map(|b| b / GIB)
        .collect()
}

/// `n` geometrically spaced points from `lo` to `hi`, endpoints exact
fn geomspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    let ratio = hi / lo;
    let mut edges: Vec<f64> = (0..n)
        .map(|i| lo * ratio.powf(i as f64 / (n - 1) as f64))
        .collect();
    edges[0] = lo;
    edges[n - 1] = hi;
    edges
}

fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
        .collect()
}

/// Powers of ten spanning `[min, max]`: `10^floor(log10 min) ..= 10^ceil(log10 max)`
pub fn decade_ticks(min: f64, max: f64) -> Vec<f64> {
    if !(min > 0.0 && max >= min && max.is_finite()) {
        return Vec::new();
    }
    let lo = min.log10().floor() as i32;
    let hi = max.log10().ceil() as i32;
    // parsed rather than powi'd so 1e-3 stays exactly 0.001
    (lo..=hi)
        .filter_map(|k| format!("1e{k}").parse::<f64>().ok())
        .collect()
}

/// Histogram over GiB sizes.
///
/// Bins are half-open `[edge_i, edge_i+1)` except the last, which also
/// holds its right edge.
#[derive(Debug, Clone, PartialEq)]
pub struct LogHistogram {
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
    pub ticks: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct BinRow {
    lower_gb: f64,
    upper_gb: f64,
    count: u64,
}

impl LogHistogram {
    /// `None` when `sizes_gb` has no positive values or `bins` is zero.
    pub fn build(sizes_gb: &[f64], bins: usize) -> Option<Self> {
        let values: Vec<f64> = sizes_gb
            .iter()
            .copied()
            .filter(|v| v.is_finite() && *v > 0.0)
            .collect();
        if values.is_empty() || bins == 0 {
            return None;
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let edges = if min == max {
            linspace(min - 0.5, min + 0.5, FLAT_BINS + 1)
        } else {
            geomspace(min, max, bins + 1)
        };

        let mut counts = vec![0u64; edges.len() - 1];
        let last = counts.len() - 1;
        for v in &values {
            // index of the last edge <= v
            let idx = edges.partition_point(|e| e <= v).saturating_sub(1);
            counts[idx.min(last)] += 1;
        }

        Some(Self {
            edges,
            counts,
            ticks: decade_ticks(min, max),
        })
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    fn rows(&self) -> impl Iterator<Item = BinRow> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(w, &count)| BinRow {
                lower_gb: w[0],
                upper_gb: w[1],
                count,
            })
    }

    /// Bins as CSV: `lower_gb,upper_gb,count`
    pub fn write_csv<W: Write>(&self, out: W) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(out);
        for row in self.rows() {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Markdown bin table followed by the decade ticks
    pub fn to_markdown(&self) -> String {
        let mut lines = vec![
            "| Bin | From [GB] | To [GB] | Datasets |".to_string(),
            "|---:|---:|---:|---:|".to_string(),
        ];
        for (i, row) in self.rows().enumerate() {
            lines.push(format!(
                "| {} | {} | {} | {} |",
                i + 1,
                fmt_gb(row.lower_gb),
                fmt_gb(row.upper_gb),
                fmt_grouped(row.count as f64, 0)
            ));
        }
        let ticks: Vec<String> = self.ticks.iter().map(|t| format!("{t}")).collect();
        lines.push(String::new());
        lines.push(format!("Decade ticks [GB]: {}", ticks.join(", ")));
        lines.join("\n") + "\n"
    }
}

/// GiB with enough precision for sub-megabyte bins
fn fmt_gb(v: f64) -> String {
    if v >= 1.0 {
        fmt_grouped(v, 3)
    } else {
        format!("{v:.6}")
    }
}

/// One step of the empirical CDF
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CdfPoint {
    pub size_gb: f64,
    pub fraction: f64,
}

/// Sorted sizes paired with the cumulative fraction `i/n` (1-based `i`)
pub fn cdf_points(sizes_gb: &[f64]) -> Vec<CdfPoint> {
    let mut sorted: Vec<f64> = sizes_gb.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len() as f64;
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, size_gb)| CdfPoint {
            size_gb,
            fraction: (i + 1) as f64 / n,
        })
        .collect()
}

/// CDF as CSV: `size_gb,fraction`
pub fn write_cdf_csv(path: &Path, points: &[CdfPoint]) -> anyhow::Result<()> {
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("Cannot create {}", path.display()))?;
    for p in points {
        wtr.serialize(p)?;
    }
    wtr.flush()?;
    Ok(())
}
