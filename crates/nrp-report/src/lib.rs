//! nrp report - statistics and report rendering over harvested records
//!
//! Size statistics and percentiles, log-scale histogram bins, the top-N
//! enrichment and the community overview. Everything renders to Markdown
//! or CSV; nothing here draws charts.

pub mod bytes;
pub mod communities;
pub mod histogram;
pub mod markdown;
pub mod stats;
pub mod top;

// Re-exports for convenience
pub use bytes::{fmt_bytes, fmt_grouped};
pub use communities::render_communities;
pub use histogram::{CdfPoint, LogHistogram, cdf_points, decade_ticks, positive_gib};
pub use markdown::{render_distribution_summary, render_size_report};
pub use stats::{SizeStats, percentile};
pub use top::{TopEntry, TopReport, enrich_top, index_raw, select_top};
