//! Harvest configuration

use std::path::PathBuf;

/// Public listing of all datasets on the national repository
pub const DEFAULT_URL: &str = "https://data.narodni-repozitar.cz/datasets/all/";

pub const RAW_FILE: &str = "records.jsonl";
pub const FLAT_FILE: &str = "records_flat.parquet";

/// Runtime configuration for one harvest
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub start_url: String,
    pub output_dir: PathBuf,
    /// `size=` hint; only sent on a start URL without a query string
    pub page_size: Option<usize>,
    pub max_records: Option<usize>,
    pub zstd_level: i32,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            start_url: DEFAULT_URL.to_string(),
            output_dir: PathBuf::from("outputs"),
            page_size: Some(100),
            max_records: None,
            zstd_level: 3,
        }
    }
}

impl HarvestConfig {
    /// `<prefix>/datasets/` when the start URL lists `/datasets/all`
    pub fn detail_base(&self) -> Option<String> {
        detail_base(&self.start_url)
    }

    pub fn raw_path(&self) -> PathBuf {
        self.output_dir.join(RAW_FILE)
    }

    pub fn flat_path(&self) -> PathBuf {
        self.output_dir.join(FLAT_FILE)
    }
}

/// Derive the per-record detail base from a listing URL.
pub fn detail_base(start_url: &str) -> Option<String> {
    let idx = start_url.find("/datasets/all")?;
    Some(format!("{}/datasets/", &start_url[..idx]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_base_from_default_url() {
        assert_eq!(
            detail_base(DEFAULT_URL).as_deref(),
            Some("https://data.narodni-repozitar.cz/datasets/")
        );
    }

    #[test]
    fn detail_base_ignores_query() {
        assert_eq!(
            detail_base("https://repo.test/c/datasets/all/?q=x").as_deref(),
            Some("https://repo.test/c/datasets/")
        );
    }

    #[test]
    fn detail_base_absent_for_other_urls() {
        assert_eq!(detail_base("https://repo.test/api/records"), None);
    }

    #[test]
    fn output_paths() {
        let config = HarvestConfig {
            output_dir: PathBuf::from("/tmp/out"),
            ..Default::default()
        };
        assert_eq!(config.raw_path(), PathBuf::from("/tmp/out/records.jsonl"));
        assert_eq!(
            config.flat_path(),
            PathBuf::from("/tmp/out/records_flat.parquet")
        );
    }
}
