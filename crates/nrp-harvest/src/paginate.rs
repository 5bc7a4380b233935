//! Cursor-following record iterator

use std::collections::VecDeque;

use nrp_core::{FetchError, JsonSource};
use serde_json::Value;

use crate::page::Page;

/// First request URL: the page-size hint is added only to a bare start URL.
pub fn first_page_url(start_url: &str, page_size: Option<usize>) -> String {
    match page_size {
        Some(size) if size > 0 && !start_url.contains('?') => format!("{start_url}?size={size}"),
        _ => start_url.to_string(),
    }
}

/// Lazy, finite sequence of raw records across API pages.
///
/// Follows `links.next` until it is absent, a page comes back empty, or
/// `max_records` records have been yielded. A fetch error is yielded once,
/// after which the iterator is exhausted.
pub struct Paginator<S> {
    source: S,
    next_url: Option<String>,
    buffer: VecDeque<Value>,
    remaining: Option<usize>,
    total: Option<u64>,
    pages: usize,
    done: bool,
}

impl<S: JsonSource> Paginator<S> {
    pub fn new(
        source: S,
        start_url: &str,
        page_size: Option<usize>,
        max_records: Option<usize>,
    ) -> Self {
        Self {
            source,
            next_url: Some(first_page_url(start_url, page_size)),
            buffer: VecDeque::new(),
            remaining: max_records,
            total: None,
            pages: 0,
            done: false,
        }
    }

    /// Total hit count from the most recent page that reported one
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Pages fetched so far
    pub fn pages(&self) -> usize {
        self.pages
    }

    fn fetch_next_page(&mut self) -> Result<(), FetchError> {
        let Some(url) = self.next_url.take() else {
            self.done = true;
            return Ok(());
        };
        let page = Page::from_payload(self.source.get_json(&url)?);
        self.pages += 1;
        if page.total.is_some() {
            self.total = page.total;
        }
        log::debug!(
            "page {}: {} records, next={}",
            self.pages,
            page.records.len(),
            page.next.as_deref().unwrap_or("-")
        );
        if page.records.is_empty() {
            self.done = true;
        } else {
            self.next_url = page.next;
            self.buffer.extend(page.records);
        }
        Ok(())
    }
}

impl<S: JsonSource> Iterator for Paginator<S> {
    type Item = Result<Value, FetchError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.remaining == Some(0) {
                return None;
            }
            if let Some(record) = self.buffer.pop_front() {
                if let Some(left) = self.remaining.as_mut() {
                    *left -= 1;
                }
                return Some(Ok(record));
            }
            if self.done {
                return None;
            }
            if let Err(e) = self.fetch_next_page() {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MapSource;
    use serde_json::json;

    const START: &str = "https://repo.test/api/datasets/all/";

    fn ids(records: Vec<Value>) -> Vec<String> {
        records
            .into_iter()
            .map(|r| r["id"].as_str().unwrap().to_string())
            .collect()
    }

    fn two_pages() -> MapSource {
        MapSource::new()
            .with_json(
                &format!("{START}?size=2"),
                json!({
                    "hits": {"hits": [{"id": "r1"}, {"id": "r2"}], "total": {"value": 3}},
                    "links": {"next": "https://repo.test/api/datasets/all/?page=2&size=2"}
                }),
            )
            .with_json(
                "https://repo.test/api/datasets/all/?page=2&size=2",
                json!({"hits": {"hits": [{"id": "r3"}], "total": {"value": 3}}, "links": {}}),
            )
    }

    #[test]
    fn yields_union_of_pages_in_order() {
        let source = two_pages();
        let mut pager = Paginator::new(&source, START, Some(2), None);
        let records: Vec<Value> = pager.by_ref().collect::<Result<_, _>>().unwrap();
        assert_eq!(ids(records), vec!["r1", "r2", "r3"]);
        assert_eq!(pager.pages(), 2);
        assert_eq!(pager.total(), Some(3));
    }

    #[test]
    fn record_cap_is_exact() {
        let source = two_pages();
        let records: Vec<Value> = Paginator::new(&source, START, Some(2), Some(1))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(ids(records), vec!["r1"]);
        // cap reached inside page 1: page 2 never requested
        assert_eq!(source.requested().len(), 1);
    }

    #[test]
    fn record_cap_across_pages() {
        let source = two_pages();
        let records: Vec<Value> = Paginator::new(&source, START, Some(2), Some(3))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(ids(records), vec!["r1", "r2", "r3"]);
    }

    #[test]
    fn zero_cap_fetches_nothing() {
        let source = two_pages();
        assert_eq!(Paginator::new(&source, START, Some(2), Some(0)).count(), 0);
        assert!(source.requested().is_empty());
    }

    #[test]
    fn empty_page_stops_even_with_next_link() {
        let source = MapSource::new().with_json(
            START,
            json!({"hits": {"hits": []}, "links": {"next": "https://repo.test/loop"}}),
        );
        assert_eq!(Paginator::new(&source, START, None, None).count(), 0);
        assert_eq!(source.requested(), vec![START.to_string()]);
    }

    #[test]
    fn fatal_error_yielded_once_then_fused() {
        let source = MapSource::new()
            .with_json(
                START,
                json!({"items": [{"id": "a"}], "links": {"next": "https://repo.test/p2"}}),
            )
            .with_status("https://repo.test/p2", 403);
        let mut pager = Paginator::new(&source, START, None, None);
        assert!(pager.next().unwrap().is_ok());
        let err = pager.next().unwrap().unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert!(pager.next().is_none());
        assert!(pager.next().is_none());
    }

    #[test]
    fn size_hint_only_on_bare_url() {
        assert_eq!(first_page_url(START, Some(100)), format!("{START}?size=100"));
        assert_eq!(
            first_page_url("https://repo.test/api?q=x", Some(100)),
            "https://repo.test/api?q=x"
        );
        assert_eq!(first_page_url(START, None), START);
        assert_eq!(first_page_url(START, Some(0)), START);
    }
}
