//! Blocking HTTP access to the repository API.
//!
//! Uses async reqwest internally on a shared current-thread runtime,
//! but presents a sync interface: every call blocks the caller.

use std::sync::LazyLock;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};

use crate::error::FetchError;
use crate::retry::{RetryPolicy, retry_with_backoff};
use crate::source::JsonSource;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("nrp-harvest/", env!("CARGO_PKG_VERSION"));

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// HTTP settings (config file defaults, CLI overrides)
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Whole-request timeout
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// Bearer token sent as `Authorization` header
    pub token: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
            token: None,
        }
    }
}

/// Reusable HTTP session: one connection pool, default headers, retry policy.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                FetchError::Http {
                    status: None,
                    message: format!("invalid token: {e}"),
                }
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(config.timeout)
            .build()
            .map_err(FetchError::from_reqwest)?;

        Ok(Self {
            client,
            retry: config.retry,
        })
    }

    /// Single GET without retry; non-2xx statuses become `FetchError::Http`
    fn get_once(&self, url: &str) -> Result<String, FetchError> {
        SHARED_RUNTIME.block_on(async {
            let resp = self
                .client
                .get(url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(FetchError::from_reqwest)?;
            resp.text().await.map_err(FetchError::from_reqwest)
        })
    }
}

impl JsonSource for HttpFetcher {
    fn get_text(&self, url: &str) -> Result<String, FetchError> {
        log::debug!("GET {url}");
        retry_with_backoff(url, &self.retry, || self.get_once(url))
    }
}
