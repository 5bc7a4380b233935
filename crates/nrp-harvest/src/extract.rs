//! Shape-tolerant field extraction from loosely structured records.
//!
//! Every extractor tries a fixed list of JSON pointers in priority order
//! and returns `None` when nothing usable is found; none of them fail.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::date::parse_year;

/// Keys that may hold a record identifier, in priority order
pub const ID_KEYS: [&str; 3] = ["id", "pid", "record_id"];

/// Preferred `metadata.dates[].type` values for the publication year
const PUBLICATION_DATE_TYPES: [&str; 4] = ["issued", "publication", "published", "pub"];

/// Link keys that point at a human-facing landing page
const HTML_LINK_KEYS: [&str; 4] = ["self_html", "html", "landing_page", "record_html"];

/// Loose truthiness: null, false, 0, "" and empty containers are "absent".
pub fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// First truthy value among JSON pointers
pub fn first_at<'a>(v: &'a Value, pointers: &[&str]) -> Option<&'a Value> {
    pointers
        .iter()
        .find_map(|p| v.pointer(p).filter(|x| truthy(x)))
}

/// Scalar as text: trimmed non-empty strings, numbers, booleans
pub fn scalar_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First pointer yielding a usable scalar string
pub fn first_string(v: &Value, pointers: &[&str]) -> Option<String> {
    first_at(v, pointers).and_then(scalar_string)
}

/// Non-blank, trimmed string
fn non_blank(v: &Value) -> Option<String> {
    v.as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Record identifier (`id`, `pid` or `record_id`)
pub fn record_id(rec: &Value) -> Option<String> {
    ID_KEYS
        .iter()
        .find_map(|k| rec.get(*k).filter(|v| truthy(v)).and_then(scalar_string))
}

pub fn created(rec: &Value) -> Option<String> {
    first_string(rec, &["/created", "/metadata/created"])
}

pub fn updated(rec: &Value) -> Option<String> {
    first_string(rec, &["/updated", "/metadata/updated"])
}

/// Title: `metadata.title`, `metadata.titles[].title`, `titles[].title`, `title`
pub fn title(rec: &Value) -> Option<String> {
    if let Some(t) = rec.pointer("/metadata/title").and_then(non_blank) {
        return Some(t);
    }
    for pointer in ["/metadata/titles", "/titles"] {
        if let Some(Value::Array(titles)) = rec.pointer(pointer) {
            if let Some(t) = titles
                .iter()
                .find_map(|t| t.get("title").and_then(non_blank))
            {
                return Some(t);
            }
        }
    }
    rec.get("title").and_then(non_blank)
}

pub fn publication_date(rec: &Value) -> Option<String> {
    first_string(
        rec,
        &[
            "/metadata/publication_date",
            "/metadata/dates/0/date",
            "/publication_date",
        ],
    )
}

pub fn access_status(rec: &Value) -> Option<String> {
    first_string(rec, &["/access/record", "/access_status"])
}

/// Publication year with fallbacks down to `updated`/`created`.
pub fn publication_year(rec: &Value) -> Option<i32> {
    for pointer in [
        "/publication_year",
        "/metadata/publication_year",
        "/metadata/publication_date",
        "/metadata/date",
    ] {
        if let Some(y) = rec.pointer(pointer).and_then(parse_year) {
            return Some(y);
        }
    }

    if let Some(Value::Array(dates)) = rec.pointer("/metadata/dates") {
        let mut first_any = None;
        for d in dates.iter().filter(|d| d.is_object()) {
            let Some(y) = first_at(d, &["/date", "/value"]).and_then(parse_year) else {
                continue;
            };
            let kind = first_at(d, &["/type", "/description"])
                .and_then(scalar_string)
                .unwrap_or_default()
                .to_lowercase();
            if PUBLICATION_DATE_TYPES.contains(&kind.as_str()) {
                return Some(y);
            }
            first_any.get_or_insert(y);
        }
        if first_any.is_some() {
            return first_any;
        }
    }

    ["updated", "created"]
        .iter()
        .find_map(|k| rec.get(*k).and_then(parse_year))
}

/// Organisation name of one affiliation entry
fn affiliation_name(a: &Value) -> Option<String> {
    match a {
        Value::Object(_) => first_at(a, &["/fullName", "/name", "/organization", "/value"])
            .and_then(non_blank),
        _ => non_blank(a),
    }
}

/// Distinct creator/contributor affiliations, sorted, joined with `"; "`.
pub fn affiliations(rec: &Value) -> Option<String> {
    let mut bag = BTreeSet::new();
    for key in ["/metadata/creators", "/metadata/contributors"] {
        let Some(Value::Array(people)) = rec.pointer(key) else {
            continue;
        };
        for person in people.iter().filter(|p| p.is_object()) {
            for field in ["affiliation", "affiliations"] {
                match person.get(field) {
                    Some(Value::Array(list)) => bag.extend(list.iter().filter_map(affiliation_name)),
                    Some(other) => bag.extend(affiliation_name(other)),
                    None => {}
                }
            }
        }
    }
    (!bag.is_empty()).then(|| bag.into_iter().collect::<Vec<_>>().join("; "))
}

/// Community slug of a record (InvenioRDM `parent.communities` variants)
pub fn community_slug(rec: &Value) -> Option<String> {
    if let Some(slug) = ["/parent/communities/default", "/communities/default"]
        .iter()
        .find_map(|p| rec.pointer(p).and_then(non_blank))
    {
        return Some(slug);
    }
    let first = first_at(rec, &["/parent/communities/ids", "/communities/ids"])?
        .as_array()?
        .first()?;
    match first {
        Value::Object(_) => first_at(first, &["/slug", "/id", "/identifier"]).and_then(non_blank),
        _ => non_blank(first),
    }
}

/// Human-facing URL: an HTML link if present, else `<base>/<community>/datasets/<id>`.
pub fn ui_url(rec: &Value, rid: &str, base_url: &str) -> String {
    for key in HTML_LINK_KEYS {
        if let Some(link) = rec.get("links").and_then(|l| l.get(key)).and_then(non_blank) {
            return link.trim_end_matches('/').to_string();
        }
    }
    let community = community_slug(rec).unwrap_or_else(|| "general".to_string());
    let base = base_url.trim_end_matches('/');
    format!("{base}/{community}/datasets/{rid}")
        .trim_end_matches('/')
        .to_string()
}

/// JSON detail URL: `links.self`, else `<base>/datasets/<id>`.
pub fn detail_api_url(rec: &Value, rid: &str, base_url: &str) -> String {
    match rec.pointer("/links/self").and_then(non_blank) {
        Some(link) => link,
        None => format!("{}/datasets/{rid}", base_url.trim_end_matches('/')),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness() {
        assert!(!truthy(&json!(null)));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!([])));
        assert!(!truthy(&json!({})));
        assert!(truthy(&json!("x")));
        assert!(truthy(&json!(0.5)));
        assert!(truthy(&json!([0])));
    }

    #[test]
    fn record_id_priority_and_numbers() {
        assert_eq!(record_id(&json!({"id": "a", "pid": "b"})).as_deref(), Some("a"));
        assert_eq!(record_id(&json!({"id": "", "pid": "b"})).as_deref(), Some("b"));
        assert_eq!(record_id(&json!({"record_id": 42})).as_deref(), Some("42"));
        assert_eq!(record_id(&json!({"title": "x"})), None);
    }

    #[test]
    fn created_updated_fallback_to_metadata() {
        let rec = json!({"metadata": {"created": "2020-01-01", "updated": "2021-01-01"}});
        assert_eq!(created(&rec).as_deref(), Some("2020-01-01"));
        assert_eq!(updated(&rec).as_deref(), Some("2021-01-01"));
        let rec = json!({"created": "top", "metadata": {"created": "nested"}});
        assert_eq!(created(&rec).as_deref(), Some("top"));
    }

    #[test]
    fn title_variants_in_priority_order() {
        assert_eq!(
            title(&json!({"metadata": {"title": "  Main  "}, "title": "x"})).as_deref(),
            Some("Main")
        );
        assert_eq!(
            title(&json!({"metadata": {"title": " ", "titles": [{"title": ""}, {"title": "Second"}]}}))
                .as_deref(),
            Some("Second")
        );
        assert_eq!(
            title(&json!({"titles": [{"lang": "cs", "title": "Nazev"}]})).as_deref(),
            Some("Nazev")
        );
        assert_eq!(title(&json!({"title": "Plain"})).as_deref(), Some("Plain"));
        assert_eq!(title(&json!({"title": ["not", "a", "string"]})), None);
    }

    #[test]
    fn title_object_without_string_falls_through() {
        // metadata.title as a multilingual object is not usable
        let rec = json!({"metadata": {"title": {"cs": "Nazev"}}, "title": "Fallback"});
        assert_eq!(title(&rec).as_deref(), Some("Fallback"));
    }

    #[test]
    fn publication_date_variants() {
        assert_eq!(
            publication_date(&json!({"metadata": {"dates": [{"date": "2019-05"}]}})).as_deref(),
            Some("2019-05")
        );
        assert_eq!(
            publication_date(&json!({"publication_date": "2018"})).as_deref(),
            Some("2018")
        );
    }

    #[test]
    fn access_status_variants() {
        assert_eq!(
            access_status(&json!({"access": {"record": "public"}})).as_deref(),
            Some("public")
        );
        assert_eq!(
            access_status(&json!({"access_status": "restricted"})).as_deref(),
            Some("restricted")
        );
    }

    #[test]
    fn publication_year_direct_fields() {
        assert_eq!(publication_year(&json!({"publication_year": 2001})), Some(2001));
        assert_eq!(
            publication_year(&json!({"metadata": {"publication_date": "2002-02-02"}})),
            Some(2002)
        );
        assert_eq!(publication_year(&json!({"metadata": {"date": "2003"}})), Some(2003));
    }

    #[test]
    fn publication_year_prefers_issued_date() {
        let rec = json!({"metadata": {"dates": [
            {"date": "2010-01-01", "type": "created"},
            "not-an-object",
            {"value": "2012-06-01", "type": "Issued"}
        ]}});
        assert_eq!(publication_year(&rec), Some(2012));
    }

    #[test]
    fn publication_year_first_any_date() {
        let rec = json!({"metadata": {"dates": [
            {"date": "garbage", "type": "issued"},
            {"date": "2010-01-01", "type": "collected"},
            {"date": "2011-01-01", "type": "valid"}
        ]}});
        assert_eq!(publication_year(&rec), Some(2010));
    }

    #[test]
    fn publication_year_falls_back_to_timestamps() {
        let rec = json!({"updated": "2024-03-01T10:00:00Z", "created": "2023-01-01"});
        assert_eq!(publication_year(&rec), Some(2024));
        assert_eq!(publication_year(&json!({"created": "2023-01-01"})), Some(2023));
        assert_eq!(publication_year(&json!({})), None);
    }

    #[test]
    fn affiliations_collects_all_shapes() {
        let rec = json!({"metadata": {
            "creators": [
                {"name": "A", "affiliations": [{"name": "Charles University"}, "CTU Prague"]},
                {"name": "B", "affiliation": {"fullName": "Masaryk University"}},
                {"name": "C", "affiliation": " CTU Prague "}
            ],
            "contributors": [
                {"affiliations": [{"organization": "Academy of Sciences"}, {"id": "ror:1"}]}
            ]
        }});
        assert_eq!(
            affiliations(&rec).as_deref(),
            Some("Academy of Sciences; CTU Prague; Charles University; Masaryk University")
        );
    }

    #[test]
    fn affiliations_none_when_empty() {
        assert_eq!(affiliations(&json!({"metadata": {"creators": [{"name": "A"}]}})), None);
        assert_eq!(affiliations(&json!({})), None);
    }

    #[test]
    fn community_slug_variants() {
        assert_eq!(
            community_slug(&json!({"parent": {"communities": {"default": "cuni"}}})).as_deref(),
            Some("cuni")
        );
        assert_eq!(
            community_slug(&json!({"communities": {"default": "mu"}})).as_deref(),
            Some("mu")
        );
        assert_eq!(
            community_slug(&json!({"parent": {"communities": {"ids": ["cvut", "x"]}}})).as_deref(),
            Some("cvut")
        );
        assert_eq!(
            community_slug(&json!({"communities": {"ids": [{"slug": "vut"}]}})).as_deref(),
            Some("vut")
        );
        assert_eq!(community_slug(&json!({"communities": {"ids": []}})), None);
    }

    #[test]
    fn ui_url_prefers_html_link() {
        let rec = json!({"links": {"self": "https://r/api/1", "self_html": "https://r/records/1/"}});
        assert_eq!(ui_url(&rec, "1", "https://r"), "https://r/records/1");
    }

    #[test]
    fn ui_url_built_from_community() {
        let rec = json!({"parent": {"communities": {"default": "cuni"}}});
        assert_eq!(ui_url(&rec, "abc", "https://r/"), "https://r/cuni/datasets/abc");
        assert_eq!(ui_url(&json!({}), "abc", "https://r"), "https://r/general/datasets/abc");
    }

    #[test]
    fn detail_api_url_variants() {
        let rec = json!({"links": {"self": "https://r/api/datasets/abc"}});
        assert_eq!(detail_api_url(&rec, "abc", "https://r"), "https://r/api/datasets/abc");
        assert_eq!(detail_api_url(&json!({}), "abc", "https://r/"), "https://r/datasets/abc");
    }
}
