//! Response page shapes: where the records, the cursor and the total live

use serde_json::Value;

/// Object keys that may hold a plain record list, in priority order
const LIST_KEYS: [&str; 4] = ["items", "results", "data", "records"];

/// One decoded API page
#[derive(Debug, Default)]
pub struct Page {
    pub records: Vec<Value>,
    /// `links.next` cursor
    pub next: Option<String>,
    /// `hits.total` (plain number or `{"value": n}`)
    pub total: Option<u64>,
}

impl Page {
    pub fn from_payload(mut payload: Value) -> Self {
        let next = next_link(&payload);
        let total = hits_total(&payload);
        Self {
            records: take_records(&mut payload),
            next,
            total,
        }
    }
}

/// Move the record list out of a page payload.
///
/// Accepted shapes: a bare list, `hits.hits`, `hits` as list, then the
/// first list among [`LIST_KEYS`]. Anything else is an empty page.
pub fn take_records(payload: &mut Value) -> Vec<Value> {
    if let Value::Array(items) = payload {
        return std::mem::take(items);
    }
    let Some(obj) = payload.as_object_mut() else {
        return Vec::new();
    };
    if let Some(hits) = obj.get_mut("hits") {
        match hits {
            Value::Object(inner) => {
                if let Some(Value::Array(items)) = inner.get_mut("hits") {
                    return std::mem::take(items);
                }
            }
            Value::Array(items) => return std::mem::take(items),
            _ => {}
        }
    }
    for key in LIST_KEYS {
        if let Some(Value::Array(items)) = obj.get_mut(key) {
            return std::mem::take(items);
        }
    }
    Vec::new()
}

/// `links.next` of an object payload, if non-empty
pub fn next_link(payload: &Value) -> Option<String> {
    payload
        .pointer("/links/next")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Total hit count reported by a search page
pub fn hits_total(payload: &Value) -> Option<u64> {
    let total = payload.pointer("/hits/total")?;
    match total {
        Value::Object(_) => total.get("value").and_then(Value::as_u64),
        _ => total.as_u64(),
    }
}
