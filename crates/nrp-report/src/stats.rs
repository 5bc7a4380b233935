//! Descriptive statistics over record sizes

use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use nrp_core::fmt_num;
use nrp_harvest::FlatRow;

use crate::bytes::{fmt_bytes, fmt_grouped};

/// Percentiles reported when none are requested
pub const DEFAULT_PERCENTILES: [f64; 5] = [0.10, 0.25, 0.50, 0.75, 0.90];

/// Linear-interpolation percentile of ascending `sorted`, `q` in `[0, 1]`.
///
/// Position `q·(n−1)` between closest ranks, the numpy/pandas default.
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Size statistics of the non-null `bytes_total` column
#[derive(Debug, Clone, PartialEq)]
pub struct SizeStats {
    pub count: usize,
    pub total: f64,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Sample variance (n−1); undefined for a single value
    pub var_sample: Option<f64>,
    pub std_sample: Option<f64>,
    pub var_pop: f64,
    pub std_pop: f64,
    sorted: Vec<f64>,
}

impl SizeStats {
    /// `None` for an empty input
    pub fn compute(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len() as f64;
        let total: f64 = sorted.iter().sum();
        let mean = total / n;
        let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        let var_pop = ss / n;
        let var_sample = (sorted.len() > 1).then(|| ss / (n - 1.0));

        Some(Self {
            count: sorted.len(),
            total,
            mean,
            median: percentile(&sorted, 0.5)?,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            var_sample,
            std_sample: var_sample.map(f64::sqrt),
            var_pop,
            std_pop: var_pop.sqrt(),
            sorted,
        })
    }

    /// Statistics of the rows that carry a byte total
    pub fn from_rows(rows: &[FlatRow]) -> Option<Self> {
        Self::compute(rows.iter().filter_map(|r| r.bytes_total).map(|b| b as f64))
    }

    pub fn quantile(&self, q: f64) -> Option<f64> {
        percentile(&self.sorted, q)
    }

    pub fn sorted(&self) -> &[f64] {
        &self.sorted
    }

    pub fn log(&self) {
        log::info!(
            "{} records with size: total {}, mean {}, median {}",
            fmt_num(self.count),
            fmt_bytes(self.total),
            fmt_bytes(self.mean),
            fmt_bytes(self.median)
        );
    }

    /// Format summary table as a string.
    pub fn format_table(&self, percentiles: &[f64]) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Record sizes")
                    .fg(Color::Cyan)
                    .add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Size").fg(Color::Cyan),
                Cell::new("Bytes").fg(Color::Cyan),
            ]);

        let bytes_row = |label: &str, v: f64| {
            vec![label.to_string(), fmt_bytes(v), fmt_grouped(v, 0)]
        };
        table.add_row(vec!["Records".to_string(), fmt_num(self.count), String::new()]);
        table.add_row(bytes_row("Total", self.total));
        table.add_row(bytes_row("Mean", self.mean));
        table.add_row(bytes_row("Median", self.median));
        table.add_row(bytes_row("Min", self.min));
        table.add_row(bytes_row("Max", self.max));
        table.add_row(match self.std_sample {
            Some(std) => bytes_row("Std (sample)", std),
            None => vec!["Std (sample)".to_string(), "NA".to_string(), "NA".to_string()],
        });
        table.add_row(bytes_row("Std (population)", self.std_pop));
        for &q in percentiles {
            if let Some(v) = self.quantile(q) {
                table.add_row(bytes_row(&format!("p{}", percent_label(q)), v));
            }
        }
        table.to_string()
    }
}

/// `0.9` → `"90"`, `0.995` → `"99.5"`
pub fn percent_label(q: f64) -> String {
    let pct = (q * 1000.0).round() / 10.0;
    if pct.fract() == 0.0 {
        format!("{}", pct as i64)
    } else {
        format!("{pct}")
    }
}
