//! Top-N largest datasets, enriched from their detail documents

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use nrp_core::{JsonSource, ProgressContext, tick};
use nrp_harvest::FlatRow;
use nrp_harvest::doi::extract_doi;
use nrp_harvest::extract::{self, truthy};
use serde::Serialize;
use serde_json::Value;

use crate::bytes::{fmt_bytes, fmt_grouped};

pub const DEFAULT_TOP: usize = 10;
pub const DEFAULT_BASE_URL: &str = "https://data.narodni-repozitar.cz";

pub const CSV_FILE: &str = "top_datasets.csv";
pub const MARKDOWN_FILE: &str = "top_datasets.md";
pub const DETAILS_FILE: &str = "top_details.json";

/// One enriched row of the top-N table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopEntry {
    pub rank: usize,
    pub id: String,
    pub title: String,
    pub size_human: String,
    pub bytes_total: u64,
    pub doi: String,
    pub publication_year: Option<i32>,
    pub affiliations: String,
    pub url: String,
}

/// Enriched entries plus the documents they were built from
#[derive(Debug, Default)]
pub struct TopReport {
    pub entries: Vec<TopEntry>,
    /// Detail document per entry, or the raw hit when the detail failed
    pub details: Vec<Value>,
}

/// The `n` largest rows by `bytes_total`; rows without id or size are skipped.
///
/// Ties keep table order.
pub fn select_top(rows: &[FlatRow], n: usize) -> Vec<&FlatRow> {
    let mut sized: Vec<&FlatRow> = rows
        .iter()
        .filter(|r| r.bytes_total.is_some() && r.id.is_some())
        .collect();
    sized.sort_by(|a, b| b.bytes_total.cmp(&a.bytes_total));
    sized.truncate(n);
    sized
}

/// Raw harvest keyed by record id; later duplicates win.
pub fn index_raw(records: Vec<Value>) -> HashMap<String, Value> {
    records
        .into_iter()
        .filter_map(|rec| extract::record_id(&rec).map(|id| (id, rec)))
        .collect()
}

fn fetch_detail<S: JsonSource>(source: &S, url: &str) -> Value {
    match source.get_json(url) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("detail {url}: {e}");
            Value::Object(Default::default())
        }
    }
}

/// Detail first, then the raw hit
fn either<T>(detail: &Value, raw: &Value, f: impl Fn(&Value) -> Option<T>) -> Option<T> {
    f(detail).or_else(|| f(raw))
}

/// Fetch each top row's detail and extract title, DOI, year, affiliations, URL.
///
/// A failed detail fetch leaves the raw hit and flat row as the only sources.
pub fn enrich_top<S: JsonSource>(
    source: S,
    top: &[&FlatRow],
    raw: &HashMap<String, Value>,
    base_url: &str,
    progress: &ProgressContext,
) -> TopReport {
    let empty = Value::Object(Default::default());
    let pb = progress.stage_line("enrich");
    let mut report = TopReport::default();

    for (i, row) in top.iter().enumerate() {
        let (Some(rid), Some(bytes)) = (row.id.as_deref(), row.bytes_total) else {
            continue;
        };
        let hit = raw.get(rid).unwrap_or(&empty);
        let url = extract::detail_api_url(hit, rid, base_url);
        let detail = fetch_detail(&source, &url);

        let title = either(&detail, hit, extract::title)
            .or_else(|| row.title.clone())
            .unwrap_or_default();
        let doi = either(&detail, hit, extract_doi).unwrap_or_default();
        let publication_year = row
            .publication_year
            .or_else(|| either(&detail, hit, extract::publication_year));
        let affiliations = either(&detail, hit, extract::affiliations).unwrap_or_default();
        let landing = if truthy(&detail) { &detail } else { hit };

        report.entries.push(TopEntry {
            rank: i + 1,
            id: rid.to_string(),
            title,
            size_human: fmt_bytes(bytes as f64),
            bytes_total: bytes,
            doi,
            publication_year,
            affiliations,
            url: extract::ui_url(landing, rid, base_url),
        });
        report.details.push(if truthy(&detail) {
            detail
        } else {
            hit.clone()
        });
        tick(&pb, "enrich", i as u64 + 1);
    }
    pb.finish_and_clear();
    report
}

/// `|` would end a Markdown cell
fn cell(s: &str) -> String {
    s.replace('|', "\\|")
}

impl TopReport {
    pub fn write_csv(&self, path: &Path) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("Cannot create {}", path.display()))?;
        for entry in &self.entries {
            wtr.serialize(entry)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_markdown(&self) -> String {
        let mut lines = vec![
            "| Rank | id | title | size_human | bytes_total | doi | publication_year | affiliations | url |"
                .to_string(),
            "|---:|---|---|---:|---:|---|---:|---|---|".to_string(),
        ];
        for e in &self.entries {
            lines.push(format!(
                "| {} | {} | {} | {} | {} | {} | {} | {} | {} |",
                e.rank,
                cell(&e.id),
                cell(&e.title),
                e.size_human,
                fmt_grouped(e.bytes_total as f64, 0),
                cell(&e.doi),
                e.publication_year.map(|y| y.to_string()).unwrap_or_default(),
                cell(&e.affiliations),
                e.url
            ));
        }
        lines.join("\n") + "\n"
    }

    /// Pretty-printed JSON array of the detail documents
    pub fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        let file = File::create(path).with_context(|| format!("Cannot create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.details)?;
        writer.flush()?;
        Ok(())
    }

    /// CSV, Markdown and JSON into `dir`; returns the written paths
    pub fn write_all(&self, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create output directory {}", dir.display()))?;
        let csv_path = dir.join(CSV_FILE);
        let md_path = dir.join(MARKDOWN_FILE);
        let json_path = dir.join(DETAILS_FILE);
        self.write_csv(&csv_path)?;
        std::fs::write(&md_path, self.to_markdown())
            .with_context(|| format!("Cannot write {}", md_path.display()))?;
        self.write_json(&json_path)?;
        Ok(vec![csv_path, md_path, json_path])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nrp_core::FetchError;
    use serde_json::json;
    use tempfile::TempDir;

    const BASE: &str = "https://repo.test";

    /// URL → JSON body; anything else is a 404
    struct Details(HashMap<String, Value>);

    impl JsonSource for Details {
        fn get_text(&self, url: &str) -> Result<String, FetchError> {
            self.0
                .get(url)
                .map(|v| v.to_string())
                .ok_or_else(|| FetchError::Http {
                    status: Some(404),
                    message: "not found".to_string(),
                })
        }
    }

    fn row(id: &str, bytes: Option<u64>) -> FlatRow {
        FlatRow {
            id: Some(id.to_string()),
            bytes_total: bytes,
            ..Default::default()
        }
    }

    #[test]
    fn select_orders_by_size() {
        let rows = vec![
            row("a", Some(10)),
            row("b", None),
            row("c", Some(30)),
            row("d", Some(20)),
            row("e", Some(30)),
            FlatRow {
                bytes_total: Some(99),
                ..Default::default()
            },
        ];
        let ids: Vec<_> = select_top(&rows, 3)
            .iter()
            .map(|r| r.id.as_deref().unwrap())
            .collect();
        assert_eq!(ids, vec!["c", "e", "d"]);
    }

    #[test]
    fn index_by_any_id_key() {
        let idx = index_raw(vec![json!({"id": "a"}), json!({"pid": "b"}), json!({"x": 1})]);
        assert_eq!(idx.len(), 2);
        assert!(idx.contains_key("b"));
    }

    #[test]
    fn enrich_prefers_detail_then_raw_then_row() {
        let rows = vec![
            FlatRow {
                title: Some("Flat title".into()),
                publication_year: None,
                ..row("big", Some(2 * 1024 * 1024))
            },
            FlatRow {
                title: Some("Flat two".into()),
                publication_year: Some(2019),
                ..row("small", Some(1024))
            },
        ];
        let raw = index_raw(vec![
            json!({"id": "big", "links": {"self": "https://repo.test/api/big"}}),
            json!({"id": "small", "metadata": {"title": "Raw two", "doi": "doi:10.5555/small"},
                   "parent": {"communities": {"default": "chem"}}}),
        ]);
        let details = Details(HashMap::from([(
            "https://repo.test/api/big".to_string(),
            json!({
                "id": "big",
                "metadata": {
                    "title": " Detail title ",
                    "publication_date": "2021-05-04",
                    "creators": [{"affiliations": [{"name": "Uni B"}, "Uni A"]}],
                    "identifiers": [{"scheme": "doi", "identifier": "https://doi.org/10.5555/big"}]
                },
                "links": {"self_html": "https://repo.test/records/big/"}
            }),
        )]));

        let top = select_top(&rows, DEFAULT_TOP);
        let report = enrich_top(&details, &top, &raw, BASE, &ProgressContext::with_tty(false));
        assert_eq!(report.entries.len(), 2);

        let big = &report.entries[0];
        assert_eq!(big.rank, 1);
        assert_eq!(big.title, "Detail title");
        assert_eq!(big.size_human, "2.00 MB");
        assert_eq!(big.doi, "10.5555/big");
        assert_eq!(big.publication_year, Some(2021));
        assert_eq!(big.affiliations, "Uni A; Uni B");
        assert_eq!(big.url, "https://repo.test/records/big");

        // detail for "small" 404s: raw hit and flat row fill in
        let small = &report.entries[1];
        assert_eq!(small.title, "Raw two");
        assert_eq!(small.doi, "10.5555/small");
        assert_eq!(small.publication_year, Some(2019));
        assert_eq!(small.url, "https://repo.test/chem/datasets/small");

        assert_eq!(report.details[0]["id"], "big");
        assert_eq!(report.details[1]["metadata"]["title"], "Raw two");
    }

    #[test]
    fn enrich_without_raw_hit_uses_row() {
        let rows = vec![FlatRow {
            title: Some("Only flat".into()),
            ..row("lonely", Some(5))
        }];
        let top = select_top(&rows, 1);
        let report = enrich_top(
            &Details(HashMap::new()),
            &top,
            &HashMap::new(),
            BASE,
            &ProgressContext::with_tty(false),
        );
        let e = &report.entries[0];
        assert_eq!(e.title, "Only flat");
        assert_eq!(e.doi, "");
        assert_eq!(e.url, "https://repo.test/general/datasets/lonely");
        assert_eq!(report.details, vec![json!({})]);
    }

    #[test]
    fn outputs_written() {
        let dir = TempDir::new().unwrap();
        let report = TopReport {
            entries: vec![TopEntry {
                rank: 1,
                id: "x".into(),
                title: "A | B".into(),
                size_human: "1.00 KB".into(),
                bytes_total: 1024,
                doi: String::new(),
                publication_year: None,
                affiliations: String::new(),
                url: "https://repo.test/general/datasets/x".into(),
            }],
            details: vec![json!({"id": "x"})],
        };
        let paths = report.write_all(&dir.path().join("top")).unwrap();
        assert_eq!(paths.len(), 3);

        let csv = std::fs::read_to_string(&paths[0]).unwrap();
        assert!(csv.starts_with(
            "rank,id,title,size_human,bytes_total,doi,publication_year,affiliations,url\n"
        ));
        assert!(csv.contains("1,x,A | B,1.00 KB,1024,,,,https://repo.test/general/datasets/x"));

        let md = std::fs::read_to_string(&paths[1]).unwrap();
        assert!(md.contains("| 1 | x | A \\| B | 1.00 KB | 1,024 |  |  |  | https://repo.test/general/datasets/x |"));

        let json: Value = serde_json::from_str(&std::fs::read_to_string(&paths[2]).unwrap()).unwrap();
        assert_eq!(json, json!([{"id": "x"}]));
    }
}
