//! DOI normalization and extraction

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static DOI_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:doi:\s*|https?://(?:dx\.)?doi\.org/)").expect("invalid DOI prefix")
});

static BARE_DOI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"10\.\d{4,9}/\S+").expect("invalid DOI pattern"));

const TRAILING: &[char] = &[' ', '.', ',', ')', ']', ';'];

/// Metadata arrays that may carry identifier objects
const IDENTIFIER_KEYS: [&str; 3] = ["identifiers", "related_identifiers", "alternate_identifiers"];

/// Reduce a DOI-ish string to the bare `10.NNNN/...` form.
pub fn normalize_doi(s: &str) -> Option<String> {
    let s = s.trim();
    let mut rest = s;
    // `doi:` and resolver prefixes may be stacked
    while let Some(m) = DOI_PREFIX.find(rest) {
        rest = &rest[m.end()..];
    }
    if let Some(m) = BARE_DOI.find(rest) {
        return Some(m.as_str().trim_end_matches(TRAILING).to_string());
    }
    rest.starts_with("10.")
        .then(|| rest.trim_end_matches(TRAILING).to_string())
}

fn normalize_value(v: &Value) -> Option<String> {
    v.as_str().and_then(normalize_doi)
}

/// DOI of an identifier entry: `scheme == doi` first, then any string field.
fn doi_from_identifier(entry: &Value) -> Option<String> {
    match entry {
        Value::Object(obj) => {
            let scheme = ["scheme", "type"]
                .iter()
                .find_map(|k| obj.get(*k).and_then(Value::as_str).filter(|s| !s.is_empty()))
                .unwrap_or_default();
            if scheme.eq_ignore_ascii_case("doi") {
                let ident = ["identifier", "id", "value", "text"]
                    .iter()
                    .find_map(|k| obj.get(*k).filter(|v| crate::extract::truthy(v)));
                if let Some(doi) = ident.and_then(normalize_value) {
                    return Some(doi);
                }
            }
            obj.values().find_map(normalize_value)
        }
        Value::String(s) => normalize_doi(s),
        _ => None,
    }
}

/// Find a record's DOI across the places repositories put it.
pub fn extract_doi(rec: &Value) -> Option<String> {
    if let Some(doi) = rec
        .pointer("/pids/doi/identifier")
        .filter(|v| crate::extract::truthy(v))
    {
        return normalize_value(doi);
    }
    if let Some(md) = rec.get("metadata") {
        if let Some(doi) = md.get("doi").filter(|v| crate::extract::truthy(v)) {
            return normalize_value(doi);
        }
        for key in IDENTIFIER_KEYS {
            if let Some(Value::Array(entries)) = md.get(key) {
                if let Some(doi) = entries.iter().find_map(doi_from_identifier) {
                    return Some(doi);
                }
            }
        }
    }
    rec.as_object()?.values().find_map(normalize_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_strips_prefixes() {
        let expected = Some("10.1234/abc.def".to_string());
        assert_eq!(normalize_doi("10.1234/abc.def"), expected);
        assert_eq!(normalize_doi("doi: 10.1234/abc.def"), expected);
        assert_eq!(normalize_doi("DOI:10.1234/abc.def"), expected);
        assert_eq!(normalize_doi("https://doi.org/10.1234/abc.def"), expected);
        assert_eq!(normalize_doi("http://dx.doi.org/10.1234/abc.def"), expected);
    }

    #[test]
    fn normalize_trims_trailing_punctuation() {
        assert_eq!(
            normalize_doi("see (10.48700/datst.abc12)."),
            Some("10.48700/datst.abc12".to_string())
        );
        assert_eq!(
            normalize_doi("10.1234/x];"),
            Some("10.1234/x".to_string())
        );
    }

    #[test]
    fn normalize_rejects_non_doi() {
        assert_eq!(normalize_doi(""), None);
        assert_eq!(normalize_doi("https://example.org/record/1"), None);
        assert_eq!(normalize_doi("ISBN 978-3-16"), None);
    }

    #[test]
    fn normalize_short_registrant_kept_when_prefixed() {
        // fewer than 4 registrant digits: no bare match, but starts with "10."
        assert_eq!(normalize_doi("10.12/x"), Some("10.12/x".to_string()));
    }

    #[test]
    fn extract_from_pids() {
        let rec = json!({"pids": {"doi": {"identifier": "10.5555/pid", "provider": "datacite"}}});
        assert_eq!(extract_doi(&rec).as_deref(), Some("10.5555/pid"));
    }

    #[test]
    fn extract_from_metadata_doi() {
        let rec = json!({"metadata": {"doi": "https://doi.org/10.5555/md"}});
        assert_eq!(extract_doi(&rec).as_deref(), Some("10.5555/md"));
    }

    #[test]
    fn extract_from_identifier_scheme() {
        let rec = json!({"metadata": {"identifiers": [
            {"scheme": "url", "identifier": "https://example.org/x"},
            {"scheme": "DOI", "identifier": "doi:10.5555/ident"}
        ]}});
        assert_eq!(extract_doi(&rec).as_deref(), Some("10.5555/ident"));
    }

    #[test]
    fn extract_from_related_identifier_any_value() {
        let rec = json!({"metadata": {"related_identifiers": [
            {"relation": "isSupplementTo", "value": "https://doi.org/10.5555/rel"}
        ]}});
        assert_eq!(extract_doi(&rec).as_deref(), Some("10.5555/rel"));
    }

    #[test]
    fn extract_from_string_identifier_list() {
        let rec = json!({"metadata": {"alternate_identifiers": ["10.5555/alt"]}});
        assert_eq!(extract_doi(&rec).as_deref(), Some("10.5555/alt"));
    }

    #[test]
    fn extract_from_top_level_string() {
        let rec = json!({"id": "abc", "doi_url": "https://doi.org/10.5555/top"});
        assert_eq!(extract_doi(&rec).as_deref(), Some("10.5555/top"));
    }

    #[test]
    fn extract_none() {
        assert_eq!(extract_doi(&json!({"id": "abc", "metadata": {}})), None);
        assert_eq!(extract_doi(&json!([])), None);
    }
}
