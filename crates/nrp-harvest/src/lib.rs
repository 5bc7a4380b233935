//! nrp harvest - paginated record harvesting and flattening
//!
//! Walks a repository's paginated JSON API, stores the raw records as
//! NDJSON, resolves per-record file sizes and writes a flat Parquet table.
//!
//! # Example
//!
//! ```no_run
//! use nrp_core::{HttpConfig, HttpFetcher, ProgressContext};
//! use nrp_harvest::{HarvestConfig, run};
//!
//! let config = HarvestConfig {
//!     max_records: Some(50),
//!     ..Default::default()
//! };
//! let fetcher = HttpFetcher::new(&HttpConfig::default()).expect("client");
//! let summary = run(&config, &fetcher, &ProgressContext::new()).expect("harvest failed");
//! println!("{} records", summary.harvested);
//! ```

pub mod communities;
pub mod config;
pub mod date;
pub mod doi;
pub mod extract;
pub mod flatten;
pub mod page;
pub mod paginate;
pub mod runner;
pub mod schema;
pub mod size;
pub mod table;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use communities::{
    Community, CommunityListing, collect_communities, newest_records, scan_communities,
};
pub use config::{DEFAULT_URL, HarvestConfig};
pub use flatten::{FlatAccumulator, FlatRow};
pub use page::Page;
pub use paginate::Paginator;
pub use runner::{HarvestSummary, run};
pub use size::{Resolution, SizeInfo, SizeResolver, Strategy};
pub use table::{read_flat_rows, read_raw_records};
