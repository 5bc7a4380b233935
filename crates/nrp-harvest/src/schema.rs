//! Arrow schema of the flat records table

use std::sync::{Arc, LazyLock};

use arrow::datatypes::{DataType, Field, Schema};

/// records_flat.parquet: one row per harvested record
///
/// Every column is nullable: upstream records carry no fixed schema, and
/// unknown sizes must stay distinguishable from zero.
pub fn records_flat() -> &'static Arc<Schema> {
    static SCHEMA: LazyLock<Arc<Schema>> = LazyLock::new(|| {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, true),
            Field::new("created", DataType::Utf8, true), // ISO 8601 as sent
            Field::new("updated", DataType::Utf8, true),
            Field::new("title", DataType::Utf8, true),
            Field::new("publication_date", DataType::Utf8, true),
            Field::new("publication_year", DataType::Int32, true), // derived
            Field::new("access_status", DataType::Utf8, true), // public, restricted, ...
            Field::new("files_count", DataType::Int64, true),
            Field::new("bytes_total", DataType::Int64, true),
        ]))
    });
    &SCHEMA
}
