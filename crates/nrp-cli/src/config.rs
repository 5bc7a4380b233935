//! Configuration loading from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable holding the API token when the config names none
pub const TOKEN_ENV: &str = "NRP_TOKEN";

/// Global configuration for nrp
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub http: HttpSettings,
    pub output: OutputConfig,
    pub harvest: HarvestSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Repository root, e.g. `https://data.narodni-repozitar.cz`
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://data.narodni-repozitar.cz".to_string(),
            token: std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()),
        }
    }
}

impl ApiConfig {
    /// Listing of all datasets under the base URL
    pub fn listing_url(&self) -> String {
        format!("{}/datasets/all/", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Whole-request timeout in seconds
    pub timeout: u64,
    /// Retries after the first attempt
    pub max_retries: u32,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: 60,
            max_retries: 5,
        }
    }
}

impl HttpSettings {
    /// Client settings with optional CLI overrides applied
    pub fn http_config(
        &self,
        timeout: Option<u64>,
        max_retries: Option<u32>,
        token: Option<String>,
    ) -> nrp_core::HttpConfig {
        let retries = max_retries.unwrap_or(self.max_retries);
        nrp_core::HttpConfig {
            timeout: Duration::from_secs(timeout.unwrap_or(self.timeout)),
            retry: nrp_core::RetryPolicy::with_max_attempts(retries.saturating_add(1)),
            token,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub default_dir: PathBuf,
    pub compression_level: i32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_dir: PathBuf::from("./nrp_dump"),
            compression_level: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HarvestSettings {
    /// `size=` hint for the first listing page; 0 sends none
    pub page_size: usize,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self { page_size: 100 }
    }
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./nrp.toml (current directory)
    /// 2. ~/.config/nrp/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("nrp.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "nrp") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
