//! nrp core - Common infrastructure for repository harvesting
//!
//! This crate provides the blocking HTTP layer, retry policy, logging,
//! progress reporting and output sinks shared by the harvest and report
//! crates.

pub mod error;
pub mod http;
pub mod logging;
pub mod progress;
pub mod retry;
pub mod sink;
pub mod source;

// Re-exports for convenience
pub use error::FetchError;
pub use http::{HttpConfig, HttpFetcher, SHARED_RUNTIME};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, fmt_num, tick};
pub use retry::{RetryPolicy, retry_with_backoff};
pub use sink::{JsonlSink, ParquetSink};
pub use source::{JsonSource, decode_json};
