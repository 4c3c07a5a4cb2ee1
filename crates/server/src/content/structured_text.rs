//! Structured-text fields.
//!
//! Editors type tabular details (important dates, fees, links) into a plain
//! textarea, one `key : value` pair per line. Storage and the public API use
//! an ordered key/value mapping. [`encode`] turns the textarea into the
//! mapping, [`decode`] renders a stored mapping back for editing.
//!
//! Malformed lines (no colon, blank key or blank value) are dropped on
//! encode, so `decode(encode(text))` is lossy for them.

use indexmap::IndexMap;
use serde_json::Value;

/// Ordered key/value mapping backing a structured-text field.
pub type FieldMap = IndexMap<String, String>;

/// Separator written between key and value by [`decode`].
const PAIR_SEPARATOR: &str = " : ";

/// Parse a textarea block into a mapping.
///
/// Each line is split on its first colon. Later colons stay in the value, so
/// `Official site : https://ssc.gov.in` keeps its URL intact. A key that
/// appears twice keeps its first position and takes the last value.
pub fn encode(text: &str) -> FieldMap {
    let mut map = FieldMap::new();

    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        map.insert(key.to_string(), value.to_string());
    }

    map
}

/// Render a mapping as one `key : value` line per entry.
pub fn decode(map: &FieldMap) -> String {
    map.iter()
        .map(|(key, value)| format!("{key}{PAIR_SEPARATOR}{value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// [`encode`] over a loosely typed form value.
///
/// Strings are parsed; objects are normalised entry by entry (trimmed, blank
/// entries dropped); anything else, including null, becomes an empty mapping.
pub fn encode_value(value: &Value) -> FieldMap {
    match value {
        Value::String(text) => encode(text),
        Value::Object(entries) => entries
            .iter()
            .filter_map(|(key, value)| {
                let key = key.trim();
                let value = scalar_text(value)?;
                let value = value.trim();
                (!key.is_empty() && !value.is_empty()).then(|| (key.to_string(), value.to_string()))
            })
            .collect(),
        _ => FieldMap::new(),
    }
}

/// [`decode`] over a loosely typed stored value. Non-objects render as `""`.
pub fn decode_value(value: &Value) -> String {
    let Value::Object(entries) = value else {
        return String::new();
    };

    entries
        .iter()
        .filter_map(|(key, value)| {
            scalar_text(value).map(|value| format!("{key}{PAIR_SEPARATOR}{value}"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
