//! Markdown rendering of size statistics

use crate::bytes::{fmt_bytes, fmt_grouped};
use crate::stats::{SizeStats, percent_label};

/// Bullet list of summary statistics plus a percentile table.
pub fn render_size_report(stats: &SizeStats, percentiles: &[f64]) -> String {
    let mut lines = vec![
        "## Record Size Statistics".to_string(),
        String::new(),
        format!(
            "- **Records with size:** {}",
            fmt_grouped(stats.count as f64, 0)
        ),
        format!("- **Total volume:** {}", bytes_with_raw(stats.total)),
        format!("- **Mean:** {}", bytes_with_raw(stats.mean)),
        format!("- **Median:** {}", bytes_with_raw(stats.median)),
        format!(
            "- **Variance (sample):** {}",
            squared(stats.var_sample.unwrap_or(f64::NAN))
        ),
        format!(
            "- **Standard deviation (sample):** {}",
            fmt_bytes(stats.std_sample.unwrap_or(f64::NAN))
        ),
        format!("- **Variance (population):** {}", squared(stats.var_pop)),
        format!(
            "- **Standard deviation (population):** {}",
            fmt_bytes(stats.std_pop)
        ),
        String::new(),
        "### Selected percentiles".to_string(),
        String::new(),
        "| Percentile | Size | Bytes |".to_string(),
        "|---:|---:|---:|".to_string(),
    ];
    for &q in percentiles {
        let Some(v) = stats.quantile(q) else {
            continue;
        };
        lines.push(format!(
            "| {}% | {} | {} |",
            percent_label(q),
            fmt_bytes(v),
            fmt_grouped(v, 0)
        ));
    }
    lines.join("\n") + "\n"
}

/// Short distribution summary shown next to the histogram
pub fn render_distribution_summary(stats: &SizeStats) -> String {
    let q = |p: f64| fmt_bytes(stats.quantile(p).unwrap_or(f64::NAN));
    [
        format!(
            "- **Datasets:** {}",
            fmt_grouped(stats.count as f64, 0)
        ),
        format!("- **Average size:** {}", fmt_bytes(stats.mean)),
        format!("- **Median:** {}", fmt_bytes(stats.median)),
        format!("- **90th percentile:** {}", q(0.90)),
        format!("- **99th percentile:** {}", q(0.99)),
    ]
    .join("\n")
        + "\n"
}

fn bytes_with_raw(v: f64) -> String {
    format!("{} ({} B)", fmt_bytes(v), fmt_grouped(v, 0))
}

fn squared(v: f64) -> String {
    match fmt_grouped(v, 0).as_str() {
        "NA" => "NA".to_string(),
        s => format!("{s} B^2"),
    }
}
