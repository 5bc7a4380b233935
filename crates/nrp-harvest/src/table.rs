//! Readers for harvest outputs: the flat Parquet table and the raw NDJSON

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use arrow::array::{Array, ArrayRef, Int64Array, RecordBatch, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value;

use crate::flatten::FlatRow;

/// Column as Utf8, if present and castable
fn string_column(batch: &RecordBatch, name: &str) -> anyhow::Result<Option<StringArray>> {
    let Some(col) = batch.column_by_name(name) else {
        return Ok(None);
    };
    let col: ArrayRef = cast(col, &DataType::Utf8).with_context(|| format!("column {name}"))?;
    Ok(col.as_any().downcast_ref::<StringArray>().cloned())
}

/// Column as Int64, if present and castable
fn int_column(batch: &RecordBatch, name: &str) -> anyhow::Result<Option<Int64Array>> {
    let Some(col) = batch.column_by_name(name) else {
        return Ok(None);
    };
    let col: ArrayRef = cast(col, &DataType::Int64).with_context(|| format!("column {name}"))?;
    Ok(col.as_any().downcast_ref::<Int64Array>().cloned())
}

fn str_at(arr: &Option<StringArray>, i: usize) -> Option<String> {
    arr.as_ref()
        .filter(|a| a.is_valid(i))
        .map(|a| a.value(i).to_string())
}

fn int_at(arr: &Option<Int64Array>, i: usize) -> Option<i64> {
    arr.as_ref().filter(|a| a.is_valid(i)).map(|a| a.value(i))
}

/// Load a flat records table.
///
/// Missing columns read as null, so tables written by other tools with a
/// subset of the columns still load. Negative sizes read as absent.
pub fn read_flat_rows(path: &Path) -> anyhow::Result<Vec<FlatRow>> {
    let file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("Not a parquet file: {}", path.display()))?
        .build()?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch?;
        let id = string_column(&batch, "id")?;
        let created = string_column(&batch, "created")?;
        let updated = string_column(&batch, "updated")?;
        let title = string_column(&batch, "title")?;
        let publication_date = string_column(&batch, "publication_date")?;
        let publication_year = int_column(&batch, "publication_year")?;
        let access_status = string_column(&batch, "access_status")?;
        let files_count = int_column(&batch, "files_count")?;
        let bytes_total = int_column(&batch, "bytes_total")?;

        for i in 0..batch.num_rows() {
            rows.push(FlatRow {
                id: str_at(&id, i),
                created: str_at(&created, i),
                updated: str_at(&updated, i),
                title: str_at(&title, i),
                publication_date: str_at(&publication_date, i),
                publication_year: int_at(&publication_year, i).and_then(|y| i32::try_from(y).ok()),
                access_status: str_at(&access_status, i),
                files_count: int_at(&files_count, i).and_then(|c| u64::try_from(c).ok()),
                bytes_total: int_at(&bytes_total, i).and_then(|b| u64::try_from(b).ok()),
            });
        }
    }
    log::debug!("{}: {} rows", path.display(), rows.len());
    Ok(rows)
}

/// Load raw harvested records, one JSON document per line.
///
/// Blank lines are skipped; undecodable lines are logged and skipped.
pub fn read_raw_records(path: &Path) -> anyhow::Result<Vec<Value>> {
    let file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut records = Vec::new();
    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Read error in {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(v) => records.push(v),
            Err(e) => log::warn!("{}:{}: skipping bad line: {e}", path.display(), lineno + 1),
        }
    }
    Ok(records)
}
