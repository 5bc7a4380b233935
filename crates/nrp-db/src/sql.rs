//! SQL generation for loading the flat records table

use std::path::Path;

pub const TABLE: &str = "records_flat";

/// Single-quoted SQL string literal
fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Replace the records table with the contents of a parquet file.
pub fn create_table_from_parquet(parquet: &Path) -> String {
    format!(
        "CREATE OR REPLACE TABLE {TABLE} AS \
         SELECT * FROM read_parquet({})",
        quote(&parquet.to_string_lossy())
    )
}

/// Row count, rows with a positive size, summed bytes
pub fn summary_query() -> String {
    format!(
        "SELECT COUNT(*), \
                COUNT(*) FILTER (WHERE bytes_total > 0), \
                CAST(COALESCE(SUM(bytes_total), 0) AS BIGINT) \
         FROM {TABLE}"
    )
}
