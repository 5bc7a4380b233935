//! nrp db: materialise the flat records table in DuckDB
//!
//! Loads `records_flat.parquet` into a persistent database file so the
//! harvest can be queried with plain SQL.

mod sql;

pub use sql::TABLE;

use std::path::Path;

use anyhow::{Context, Result};
use duckdb::Connection;

/// What ended up in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub rows: u64,
    pub with_sizes: u64,
    pub total_bytes: u64,
}

/// Create (or replace) the `records_flat` table in `db_path` from `parquet`.
pub fn load_flat_table(parquet: &Path, db_path: &Path) -> Result<LoadSummary> {
    anyhow::ensure!(
        parquet.exists(),
        "Parquet file does not exist: {}",
        parquet.display()
    );
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create dir: {}", parent.display()))?;
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open DuckDB database: {}", db_path.display()))?;

    log::info!("Loading {} into {}", parquet.display(), db_path.display());
    conn.execute_batch(&sql::create_table_from_parquet(parquet))
        .context("Failed to create records_flat table")?;

    let summary = conn
        .query_row(&sql::summary_query(), [], |row| {
            Ok(LoadSummary {
                rows: row.get::<_, i64>(0)? as u64,
                with_sizes: row.get::<_, i64>(1)? as u64,
                total_bytes: row.get::<_, i64>(2)? as u64,
            })
        })
        .context("Failed to query load summary")?;

    log::info!(
        "{TABLE}: {} rows, {} with sizes, {} bytes",
        summary.rows,
        summary.with_sizes,
        summary.total_bytes
    );
    Ok(summary)
}
