//! JSON resource access: the seam between HTTP and the pipelines

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::FetchError;

/// Anything that can GET a URL and hand back its body.
///
/// [`HttpFetcher`](crate::HttpFetcher) is the production implementation;
/// tests substitute in-memory maps.
pub trait JsonSource {
    /// Fetch the raw response body of `url`
    fn get_text(&self, url: &str) -> Result<String, FetchError>;

    /// Fetch `url` and decode it as JSON (see [`decode_json`])
    fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        decode_json(&self.get_text(url)?)
    }
}

impl<S: JsonSource + ?Sized> JsonSource for &S {
    fn get_text(&self, url: &str) -> Result<String, FetchError> {
        (**self).get_text(url)
    }
}

static EMBEDDED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]+type=["']application/json["'][^>]*>(.*?)</script>"#)
        .expect("invalid embedded JSON pattern")
});

/// Decode a response body as JSON.
///
/// Some UI endpoints answer with HTML even when asked for JSON; the page
/// then carries its data in a `<script type="application/json">` block,
/// which is decoded instead.
pub fn decode_json(body: &str) -> Result<Value, FetchError> {
    match serde_json::from_str(body) {
        Ok(v) => Ok(v),
        Err(e) => match EMBEDDED_JSON.captures(body) {
            Some(caps) => Ok(serde_json::from_str(caps[1].trim())?),
            None => Err(e.into()),
        },
    }
}
