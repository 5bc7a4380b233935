//! Per-record file count and byte size resolution.
//!
//! Strategies, in fixed priority order:
//! 1. inline aggregates on the list hit
//! 2. the hit's `links.files` / `links.bucket` listing
//! 3. the `links.self` detail document (inline, then its files link)
//! 4. the conventional `<detail_base><id>/` detail document
//!
//! The first strategy that produces any size information wins. Failed
//! requests only mean "strategy failed"; resolution itself never errors.

use nrp_core::JsonSource;
use serde_json::Value;

use crate::extract::{first_at, record_id};

/// Keys of a files listing that may hold the entry list, after `entries`
const LISTING_KEYS: [&str; 2] = ["objects", "files"];

/// Resolved file statistics. Both `None` means unknown, never zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeInfo {
    pub files_count: Option<u64>,
    pub bytes_total: Option<u64>,
}

impl SizeInfo {
    pub const UNKNOWN: Self = Self {
        files_count: None,
        bytes_total: None,
    };

    pub fn new(files_count: Option<u64>, bytes_total: Option<u64>) -> Self {
        Self {
            files_count,
            bytes_total,
        }
    }

    pub fn is_known(&self) -> bool {
        self.files_count.is_some() || self.bytes_total.is_some()
    }

    /// Known and non-zero in at least one field
    pub fn is_nonzero(&self) -> bool {
        self.files_count.is_some_and(|c| c != 0) || self.bytes_total.is_some_and(|b| b != 0)
    }

    fn known(self) -> Option<Self> {
        self.is_known().then_some(self)
    }

    /// Count and byte sum of a file entry list; a sum past `u64::MAX` is unknown
    fn from_entries(entries: &[Value]) -> Self {
        let total = entries
            .iter()
            .map(|e| e.get("size").and_then(as_size).unwrap_or(0))
            .try_fold(0u64, u64::checked_add);
        Self::new(Some(entries.len() as u64), total)
    }
}

/// Which strategy produced the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Inline,
    FilesLink,
    SelfDetail,
    ConventionalDetail,
    Unknown,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Inline,
        Strategy::FilesLink,
        Strategy::SelfDetail,
        Strategy::ConventionalDetail,
        Strategy::Unknown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::FilesLink => "files link",
            Self::SelfDetail => "self detail",
            Self::ConventionalDetail => "conventional detail",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of resolving one record
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub size: SizeInfo,
    pub strategy: Strategy,
    /// Detail document, if one was fetched
    pub detail: Option<Value>,
}

impl Resolution {
    fn unknown(detail: Option<Value>) -> Self {
        Self {
            size: SizeInfo::UNKNOWN,
            strategy: Strategy::Unknown,
            detail,
        }
    }
}

/// Non-negative integer size from a number or numeric string.
///
/// Fractional values are truncated; negative or non-numeric values are absent.
pub fn as_size(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f as u64)
            })
        }
        _ => None,
    }
}

/// Entry list of a `files.entries` value: list, or map keyed by file name
fn entry_values(entries: &Value) -> Option<Vec<Value>> {
    match entries {
        Value::Array(list) if !list.is_empty() => Some(list.clone()),
        Value::Object(map) if !map.is_empty() => Some(map.values().cloned().collect()),
        _ => None,
    }
}

/// Strategy 1: size fields carried by the record itself.
pub fn inline_aggregates(obj: &Value) -> Option<SizeInfo> {
    if let Some(files) = obj.get("files").filter(|f| f.is_object()) {
        let count = files.get("count").and_then(as_size);
        let bytes = ["size", "total_bytes"]
            .iter()
            .find_map(|k| files.get(*k).and_then(as_size));
        if let Some(info) = SizeInfo::new(count, bytes).known() {
            return Some(info);
        }
        if let Some(entries) = files.get("entries").and_then(entry_values) {
            return Some(SizeInfo::from_entries(&entries));
        }
    }
    let count = obj.get("files_count").and_then(as_size);
    let bytes = first_at(obj, &["/bytes_total", "/files_size", "/size_bytes"]).and_then(as_size);
    SizeInfo::new(count, bytes).known()
}

/// Size of a files listing document, in any of the accepted shapes.
pub fn listing_size(data: &Value) -> Option<SizeInfo> {
    let non_empty = |v: Option<&Value>| match v {
        Some(Value::Array(list)) if !list.is_empty() => Some(list.clone()),
        _ => None,
    };
    let entries = non_empty(data.get("entries"))
        .or_else(|| non_empty(Some(data)))
        .or_else(|| non_empty(data.pointer("/hits/hits")))
        .or_else(|| LISTING_KEYS.iter().find_map(|k| non_empty(data.get(*k))))?;
    Some(SizeInfo::from_entries(&entries))
}

/// `links.files`, else `links.bucket`
fn files_link(doc: &Value) -> Option<&str> {
    first_at(doc, &["/links/files", "/links/bucket"]).and_then(Value::as_str)
}

/// Conventional detail URL `<base><id>/`
pub fn conventional_detail_url(base: &str, rid: &str) -> String {
    if base.ends_with('/') {
        format!("{base}{rid}/")
    } else {
        format!("{base}/{rid}/")
    }
}

/// Resolves sizes for harvested records against a [`JsonSource`].
pub struct SizeResolver<S> {
    source: S,
    detail_base: Option<String>,
}

impl<S: JsonSource> SizeResolver<S> {
    pub fn new(source: S, detail_base: Option<String>) -> Self {
        Self {
            source,
            detail_base,
        }
    }

    /// Strategy 2: follow a files listing link
    fn via_link(&self, link: &str) -> Option<SizeInfo> {
        match self.source.get_json(link) {
            Ok(data) => listing_size(&data),
            Err(e) => {
                log::debug!("files listing {link}: {e}");
                None
            }
        }
    }

    /// Inline, then files link, of one document
    fn from_document(&self, doc: &Value) -> Option<SizeInfo> {
        inline_aggregates(doc).or_else(|| files_link(doc).and_then(|l| self.via_link(l)))
    }

    /// Strategies 3 and 4: `None` only when the detail could not be fetched.
    fn via_detail(&self, url: &str, strategy: Strategy) -> Option<Resolution> {
        let detail = match self.source.get_json(url) {
            Ok(detail) => detail,
            Err(e) => {
                log::debug!("detail {url}: {e}");
                return None;
            }
        };
        Some(match self.from_document(&detail) {
            Some(size) => Resolution {
                size,
                strategy,
                detail: Some(detail),
            },
            None => Resolution::unknown(Some(detail)),
        })
    }

    pub fn resolve(&self, hit: &Value) -> Resolution {
        if let Some(size) = inline_aggregates(hit) {
            return Resolution {
                size,
                strategy: Strategy::Inline,
                detail: None,
            };
        }

        if let Some(size) = files_link(hit).and_then(|l| self.via_link(l)) {
            return Resolution {
                size,
                strategy: Strategy::FilesLink,
                detail: None,
            };
        }

        if let Some(link) = first_at(hit, &["/links/self"]).and_then(Value::as_str) {
            if let Some(resolution) = self.via_detail(link, Strategy::SelfDetail) {
                return resolution;
            }
        }

        if let (Some(base), Some(rid)) = (self.detail_base.as_deref(), record_id(hit)) {
            let url = conventional_detail_url(base, &rid);
            if let Some(resolution) = self.via_detail(&url, Strategy::ConventionalDetail) {
                return resolution;
            }
        }

        Resolution::unknown(None)
    }
}
