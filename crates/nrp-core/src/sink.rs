//! Output sinks: Parquet table writer and NDJSON record writer

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::RecordBatch;
use arrow::datatypes::Schema;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use serde_json::Value;

/// `<path>.tmp` next to the final file
fn tmp_path_for(final_path: &Path) -> PathBuf {
    let mut name = final_path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Create a tmp file, replacing a stale one from an interrupted run
fn create_tmp(final_path: &Path) -> std::io::Result<(File, PathBuf)> {
    let tmp_path = tmp_path_for(final_path);
    if tmp_path.exists() {
        log::warn!("Removing stale tmp file: {}", tmp_path.display());
        fs::remove_file(&tmp_path)?;
    }
    Ok((File::create(&tmp_path)?, tmp_path))
}

/// Parquet writer with atomic tmp→rename
pub struct ParquetSink {
    writer: ArrowWriter<File>,
    tmp_path: PathBuf,
    final_path: PathBuf,
    row_count: usize,
}

impl std::fmt::Debug for ParquetSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParquetSink")
            .field("final_path", &self.final_path)
            .field("row_count", &self.row_count)
            .finish_non_exhaustive()
    }
}

impl ParquetSink {
    /// Create a new sink writing to `<path>.tmp`
    pub fn new(path: &Path, schema: &Arc<Schema>, zstd_level: i32) -> std::io::Result<Self> {
        let (file, tmp_path) = create_tmp(path)?;
        let level = ZstdLevel::try_new(zstd_level)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        let props = WriterProperties::builder()
            .set_compression(Compression::ZSTD(level))
            .build();

        let writer =
            ArrowWriter::try_new(file, schema.clone(), Some(props)).map_err(std::io::Error::other)?;

        Ok(Self {
            writer,
            tmp_path,
            final_path: path.to_path_buf(),
            row_count: 0,
        })
    }

    /// Write a record batch
    pub fn write_batch(&mut self, batch: &RecordBatch) -> std::io::Result<()> {
        self.row_count += batch.num_rows();
        self.writer.write(batch).map_err(std::io::Error::other)
    }

    /// Finalize: flush footer and atomically rename tmp → final
    pub fn finalize(self) -> std::io::Result<usize> {
        let row_count = self.row_count;
        self.writer.close().map_err(std::io::Error::other)?;
        fs::rename(&self.tmp_path, &self.final_path)?;
        Ok(row_count)
    }
}

/// Newline-delimited JSON writer with atomic tmp→rename
pub struct JsonlSink {
    writer: BufWriter<File>,
    tmp_path: PathBuf,
    final_path: PathBuf,
    line_count: usize,
}

impl JsonlSink {
    pub fn new(path: &Path) -> std::io::Result<Self> {
        let (file, tmp_path) = create_tmp(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            tmp_path,
            final_path: path.to_path_buf(),
            line_count: 0,
        })
    }

    /// Append one JSON document as a single line
    pub fn write_value(&mut self, value: &Value) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, value)?;
        self.writer.write_all(b"\n")?;
        self.line_count += 1;
        Ok(())
    }

    pub fn finalize(mut self) -> std::io::Result<usize> {
        self.writer.flush()?;
        fs::rename(&self.tmp_path, &self.final_path)?;
        Ok(self.line_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int64Array;
    use arrow::datatypes::{DataType, Field};
    use tempfile::TempDir;

    #[test]
    fn parquet_sink_renames_on_finalize() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.parquet");
        let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, false)]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![Arc::new(Int64Array::from(vec![1, 2, 3]))],
        )
        .unwrap();

        let mut sink = ParquetSink::new(&path, &schema, 3).unwrap();
        sink.write_batch(&batch).unwrap();
        assert!(dir.path().join("t.parquet.tmp").exists());
        assert_eq!(sink.finalize().unwrap(), 3);

        assert!(!dir.path().join("t.parquet.tmp").exists());
        let file = File::open(&path).unwrap();
        assert!(parquet::file::reader::SerializedFileReader::new(file).is_ok());
    }

    #[test]
    fn parquet_sink_rejects_bad_zstd_level() {
        let dir = TempDir::new().unwrap();
        let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, false)]));
        assert!(ParquetSink::new(&dir.path().join("x.parquet"), &schema, 99).is_err());
    }

    #[test]
    fn jsonl_sink_writes_one_line_per_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.jsonl");
        fs::write(tmp_path_for(&path), b"stale").unwrap();

        let mut sink = JsonlSink::new(&path).unwrap();
        sink.write_value(&serde_json::json!({"id": "a", "title": "Ř"}))
            .unwrap();
        sink.write_value(&serde_json::json!({"id": "b"})).unwrap();
        assert_eq!(sink.finalize().unwrap(), 2);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec![r#"{"id":"a","title":"Ř"}"#, r#"{"id":"b"}"#]);
    }
}
