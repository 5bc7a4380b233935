//! Community enumeration and per-community newest records

use chrono::NaiveDateTime;
use nrp_core::{FetchError, JsonSource};
use serde_json::Value;

use crate::date::parse_datetime;
use crate::extract::{first_at, first_string, record_id, scalar_string};
use crate::page::Page;

/// Object keys of a communities payload that may hold a list
const COMMUNITY_LIST_KEYS: [&str; 5] = ["communities", "items", "hits", "results", "data"];

const COMMUNITY_ID_KEYS: [&str; 5] = ["/id", "/slug", "/identifier", "/code", "/name"];

/// Default number of newest records listed per community
pub const NEWEST: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Community {
    pub id: String,
    /// Display name; empty when the API gives none
    pub title: String,
}

impl Community {
    fn from_entry(entry: &Value) -> Option<Self> {
        let id = first_string(entry, &COMMUNITY_ID_KEYS)?;
        let title = first_string(entry, &["/title", "/name", "/metadata/title"]).unwrap_or_default();
        Some(Self { id, title })
    }
}

/// One community's record count and newest records
#[derive(Debug, Clone, PartialEq)]
pub struct CommunityListing {
    pub community: Community,
    /// `None` when the listing could not be fetched
    pub total: Option<u64>,
    /// `[id](href)` Markdown links, newest first
    pub newest: Vec<String>,
}

impl CommunityListing {
    fn unavailable(community: Community) -> Self {
        Self {
            community,
            total: None,
            newest: Vec::new(),
        }
    }
}

fn trim_base(base: &str) -> &str {
    base.trim_end_matches('/')
}

/// Community entries of a `/communities/` payload, deduplicated by id.
fn parse_communities(data: &Value) -> Vec<Community> {
    let mut entries: Vec<&Value> = Vec::new();
    match data {
        Value::Array(list) => entries.extend(list),
        Value::Object(obj) => {
            for key in COMMUNITY_LIST_KEYS {
                if let Some(Value::Array(list)) = obj.get(key) {
                    entries.extend(list);
                }
            }
            if let Some(Value::Array(list)) = data.pointer("/hits/hits") {
                entries.extend(list);
            }
        }
        _ => {}
    }

    let mut out: Vec<Community> = Vec::new();
    for community in entries.into_iter().filter_map(Community::from_entry) {
        match out.iter_mut().find(|c| c.id == community.id) {
            // a later entry may fill in a missing title
            Some(seen) if seen.title.is_empty() => seen.title = community.title,
            Some(_) => {}
            None => out.push(community),
        }
    }
    out
}

/// List the communities of a repository at `base`.
pub fn collect_communities<S: JsonSource>(
    source: S,
    base: &str,
) -> Result<Vec<Community>, FetchError> {
    let url = format!("{}/communities/", trim_base(base));
    let communities = parse_communities(&source.get_json(&url)?);
    log::info!("{} communities at {url}", communities.len());
    Ok(communities)
}

fn listing_id(rec: &Value) -> Option<String> {
    record_id(rec).or_else(|| rec.pointer("/metadata/id").and_then(scalar_string))
}

fn listing_updated(rec: &Value) -> Option<NaiveDateTime> {
    first_at(
        rec,
        &["/updated", "/metadata/updated", "/metadata/publication_date"],
    )
    .and_then(Value::as_str)
    .and_then(parse_datetime)
}

fn record_href(rec: &Value, rid: &str, base: &str) -> String {
    first_string(rec, &["/links/self_html", "/links/html", "/links/self"])
        .unwrap_or_else(|| format!("{}/records/{rid}", trim_base(base)))
}

/// Record count and the `n` most recently updated records of a community.
///
/// Hits are re-sorted client-side by update time; records with no
/// parseable date sort last, keeping server order among themselves.
pub fn newest_records<S: JsonSource>(
    source: S,
    base: &str,
    community: &Community,
    n: usize,
) -> Result<CommunityListing, FetchError> {
    let url = format!(
        "{}/{}/datasets/all/?sort=-by_available",
        trim_base(base),
        community.id
    );
    let page = Page::from_payload(source.get_json(&url)?);
    let total = page.total.or(Some(page.records.len() as u64));

    let mut hits: Vec<(Option<NaiveDateTime>, &Value)> = page
        .records
        .iter()
        .map(|r| (listing_updated(r), r))
        .collect();
    hits.sort_by(|a, b| b.0.cmp(&a.0));

    let newest = hits
        .into_iter()
        .filter_map(|(_, rec)| {
            let rid = listing_id(rec)?;
            let href = record_href(rec, &rid, base);
            Some(format!("[{rid}]({href})"))
        })
        .take(n)
        .collect();

    Ok(CommunityListing {
        community: community.clone(),
        total,
        newest,
    })
}

/// Enumerate communities and fetch each one's newest records.
///
/// A failing community is logged and reported without a total; only a
/// failure to list the communities themselves is an error.
pub fn scan_communities<S: JsonSource>(
    source: S,
    base: &str,
    n: usize,
) -> Result<Vec<CommunityListing>, FetchError> {
    let communities = collect_communities(&source, base)?;
    Ok(communities
        .into_iter()
        .map(|c| match newest_records(&source, base, &c, n) {
            Ok(listing) => listing,
            Err(e) => {
                log::warn!("community {}: {e}", c.id);
                CommunityListing::unavailable(c)
            }
        })
        .collect())
}
