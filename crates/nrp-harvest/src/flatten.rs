//! Record flattening: JSON record → `FlatRow` → Arrow RecordBatch

use std::sync::Arc;

use arrow::array::{ArrayRef, Int32Array, Int64Array, RecordBatch, StringArray};
use arrow::datatypes::Schema;
use arrow::error::ArrowError;
use serde_json::Value;

use crate::date::parse_year_str;
use crate::extract;
use crate::schema;
use crate::size::SizeInfo;

/// Batch size for flushing accumulated rows into a `RecordBatch`
pub const RECORD_BATCH_SIZE: usize = 8192;

/// Uniform row derived from one harvested record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRow {
    pub id: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub title: Option<String>,
    pub publication_date: Option<String>,
    /// Derived from `publication_date`
    pub publication_year: Option<i32>,
    pub access_status: Option<String>,
    pub files_count: Option<u64>,
    pub bytes_total: Option<u64>,
}

impl FlatRow {
    /// Flatten a list hit, preferring its detail document when one was fetched.
    pub fn from_record(hit: &Value, size: SizeInfo, detail: Option<&Value>) -> Self {
        let rec = detail.unwrap_or(hit);
        let publication_date = extract::publication_date(rec);
        Self {
            id: extract::record_id(rec),
            created: extract::created(rec),
            updated: extract::updated(rec),
            title: extract::title(rec),
            publication_year: publication_date.as_deref().and_then(parse_year_str),
            publication_date,
            access_status: extract::access_status(rec),
            files_count: size.files_count,
            bytes_total: size.bytes_total,
        }
    }

    pub fn size(&self) -> SizeInfo {
        SizeInfo::new(self.files_count, self.bytes_total)
    }
}

/// Column buffers for `FlatRow`s
pub struct FlatAccumulator {
    schema: Arc<Schema>,
    id: Vec<Option<String>>,
    created: Vec<Option<String>>,
    updated: Vec<Option<String>>,
    title: Vec<Option<String>>,
    publication_date: Vec<Option<String>>,
    publication_year: Vec<Option<i32>>,
    access_status: Vec<Option<String>>,
    files_count: Vec<Option<i64>>,
    bytes_total: Vec<Option<i64>>,
}

impl FlatAccumulator {
    pub fn new() -> Self {
        Self {
            schema: schema::records_flat().clone(),
            id: Vec::with_capacity(RECORD_BATCH_SIZE),
            created: Vec::with_capacity(RECORD_BATCH_SIZE),
            updated: Vec::with_capacity(RECORD_BATCH_SIZE),
            title: Vec::with_capacity(RECORD_BATCH_SIZE),
            publication_date: Vec::with_capacity(RECORD_BATCH_SIZE),
            publication_year: Vec::with_capacity(RECORD_BATCH_SIZE),
            access_status: Vec::with_capacity(RECORD_BATCH_SIZE),
            files_count: Vec::with_capacity(RECORD_BATCH_SIZE),
            bytes_total: Vec::with_capacity(RECORD_BATCH_SIZE),
        }
    }

    pub fn push(&mut self, row: FlatRow) {
        self.id.push(row.id);
        self.created.push(row.created);
        self.updated.push(row.updated);
        self.title.push(row.title);
        self.publication_date.push(row.publication_date);
        self.publication_year.push(row.publication_year);
        self.access_status.push(row.access_status);
        // Sizes beyond i64::MAX cannot come from a real listing
        self.files_count
            .push(row.files_count.and_then(|c| i64::try_from(c).ok()));
        self.bytes_total
            .push(row.bytes_total.and_then(|b| i64::try_from(b).ok()));
    }

    pub fn len(&self) -> usize {
        self.id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= RECORD_BATCH_SIZE
    }

    /// Take buffered rows as a RecordBatch, resetting internal state
    pub fn take_batch(&mut self) -> Result<RecordBatch, ArrowError> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(std::mem::take(&mut self.id))),
            Arc::new(StringArray::from(std::mem::take(&mut self.created))),
            Arc::new(StringArray::from(std::mem::take(&mut self.updated))),
            Arc::new(StringArray::from(std::mem::take(&mut self.title))),
            Arc::new(StringArray::from(std::mem::take(&mut self.publication_date))),
            Arc::new(Int32Array::from(std::mem::take(&mut self.publication_year))),
            Arc::new(StringArray::from(std::mem::take(&mut self.access_status))),
            Arc::new(Int64Array::from(std::mem::take(&mut self.files_count))),
            Arc::new(Int64Array::from(std::mem::take(&mut self.bytes_total))),
        ];
        RecordBatch::try_new(self.schema.clone(), columns)
    }
}

impl Default for FlatAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
