//! Harvest pipeline
//!
//! Phase 1: paginate the listing into `records.jsonl`.
//! Phase 2: re-read the raw records, resolve sizes, flatten into
//! `records_flat.parquet`.

use std::time::{Duration, Instant};

use anyhow::Context;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use nrp_core::{JsonSource, JsonlSink, ParquetSink, ProgressContext, fmt_num, tick};

use crate::config::HarvestConfig;
use crate::flatten::{FlatAccumulator, FlatRow};
use crate::paginate::Paginator;
use crate::schema;
use crate::size::{SizeResolver, Strategy};
use crate::table::read_raw_records;

/// Outcome of one harvest run
#[derive(Debug, Clone, Default)]
pub struct HarvestSummary {
    /// Records written to the raw file
    pub harvested: usize,
    /// Hit count the server reported, if any
    pub reported_total: Option<u64>,
    pub pages: usize,
    /// Rows in the flat table
    pub flattened: usize,
    /// Rows with a positive size or file count
    pub with_sizes: usize,
    pub total_bytes: u64,
    pub total_files: u64,
    /// Rows per resolution strategy, in `Strategy::ALL` order
    pub strategies: [usize; 5],
    pub elapsed: Duration,
}

impl HarvestSummary {
    pub fn strategy_count(&self, strategy: Strategy) -> usize {
        Strategy::ALL
            .iter()
            .position(|s| *s == strategy)
            .map_or(0, |i| self.strategies[i])
    }

    fn record(&mut self, row: &FlatRow, strategy: Strategy) {
        self.flattened += 1;
        if row.size().is_nonzero() {
            self.with_sizes += 1;
        }
        self.total_bytes = self.total_bytes.saturating_add(row.bytes_total.unwrap_or(0));
        self.total_files = self.total_files.saturating_add(row.files_count.unwrap_or(0));
        if let Some(i) = Strategy::ALL.iter().position(|s| *s == strategy) {
            self.strategies[i] += 1;
        }
    }

    pub fn log(&self) {
        log::info!(
            "Harvest complete: {} records ({} with sizes, {} files, {} bytes) in {} pages [{:.1}s]",
            fmt_num(self.harvested),
            fmt_num(self.with_sizes),
            fmt_num(self.total_files as usize),
            fmt_num(self.total_bytes as usize),
            self.pages,
            self.elapsed.as_secs_f64()
        );
    }

    pub fn print(&self) {
        eprintln!("{}", self.format_table());
    }

    /// Format summary table as a string.
    pub fn format_table(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Harvest")
                    .fg(Color::Cyan)
                    .add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Value").fg(Color::Cyan),
            ]);

        let reported = self
            .reported_total
            .map_or_else(|| "-".to_string(), |t| fmt_num(t as usize));
        table.add_row(vec!["Records harvested".to_string(), fmt_num(self.harvested)]);
        table.add_row(vec!["Reported by server".to_string(), reported]);
        table.add_row(vec!["Pages".to_string(), fmt_num(self.pages)]);
        table.add_row(vec!["With sizes".to_string(), fmt_num(self.with_sizes)]);
        table.add_row(vec!["Files".to_string(), fmt_num(self.total_files as usize)]);
        table.add_row(vec!["Bytes".to_string(), fmt_num(self.total_bytes as usize)]);
        for (strategy, count) in Strategy::ALL.iter().zip(self.strategies) {
            table.add_row(vec![format!("  via {strategy}"), fmt_num(count)]);
        }
        table.add_row(vec![
            "Elapsed".to_string(),
            format!("{:.1}s", self.elapsed.as_secs_f64()),
        ]);
        table.to_string()
    }
}

/// Run both harvest phases against `source`.
///
/// A listing fetch failure is fatal; size resolution failures only leave
/// the affected rows without sizes.
pub fn run<S: JsonSource>(
    config: &HarvestConfig,
    source: S,
    progress: &ProgressContext,
) -> anyhow::Result<HarvestSummary> {
    let start = Instant::now();
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Cannot create output directory {}",
            config.output_dir.display()
        )
    })?;

    log::info!(
        "Harvest starting: url={}, page_size={:?}, max_records={:?}",
        config.start_url,
        config.page_size,
        config.max_records
    );

    let mut summary = HarvestSummary::default();
    harvest_raw(config, &source, progress, &mut summary)?;
    flatten_raw(config, &source, progress, &mut summary)?;
    summary.elapsed = start.elapsed();
    Ok(summary)
}

/// Phase 1: listing pages → raw NDJSON
fn harvest_raw<S: JsonSource>(
    config: &HarvestConfig,
    source: &S,
    progress: &ProgressContext,
    summary: &mut HarvestSummary,
) -> anyhow::Result<()> {
    let raw_path = config.raw_path();
    let mut sink = JsonlSink::new(&raw_path)
        .with_context(|| format!("Cannot create {}", raw_path.display()))?;
    let pb = progress.stage_line("harvest");

    let mut pages = Paginator::new(
        source,
        &config.start_url,
        config.page_size,
        config.max_records,
    );
    let mut count = 0u64;
    for record in pages.by_ref() {
        let record = record.context("Listing fetch failed")?;
        sink.write_value(&record)?;
        count += 1;
        tick(&pb, "harvest", count);
    }
    pb.finish_and_clear();

    summary.harvested = sink.finalize()?;
    summary.pages = pages.pages();
    summary.reported_total = pages.total();
    log::info!(
        "Phase 1: {} records from {} pages -> {}",
        fmt_num(summary.harvested),
        summary.pages,
        raw_path.display()
    );
    Ok(())
}

/// Phase 2: raw NDJSON → sizes → flat Parquet
fn flatten_raw<S: JsonSource>(
    config: &HarvestConfig,
    source: &S,
    progress: &ProgressContext,
    summary: &mut HarvestSummary,
) -> anyhow::Result<()> {
    let records = read_raw_records(&config.raw_path())?;
    let flat_path = config.flat_path();
    let mut sink = ParquetSink::new(&flat_path, schema::records_flat(), config.zstd_level)
        .with_context(|| format!("Cannot create {}", flat_path.display()))?;
    let resolver = SizeResolver::new(source, config.detail_base());
    let mut acc = FlatAccumulator::new();
    let pb = progress.stage_line("sizes");

    for (i, hit) in records.iter().enumerate() {
        let resolution = resolver.resolve(hit);
        let row = FlatRow::from_record(hit, resolution.size, resolution.detail.as_ref());
        summary.record(&row, resolution.strategy);
        acc.push(row);
        if acc.is_full() {
            sink.write_batch(&acc.take_batch()?)?;
        }
        tick(&pb, "sizes", i as u64 + 1);
    }
    if !acc.is_empty() {
        sink.write_batch(&acc.take_batch()?)?;
    }
    pb.finish_and_clear();

    let rows = sink.finalize()?;
    log::info!(
        "Phase 2: {} rows ({} with sizes) -> {}",
        fmt_num(rows),
        fmt_num(summary.with_sizes),
        flat_path.display()
    );
    Ok(())
}
