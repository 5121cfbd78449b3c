//! Form encoding for payment API parameters.
//!
//! The payment API takes `application/x-www-form-urlencoded` bodies and
//! query strings in which nested values use bracket notation:
//! `line_items[0][price]=price_123`.

use serde_json::{Map, Value};

/// Flattens a JSON object into bracket-notation key/value pairs.
///
/// Nulls are skipped. Booleans and numbers use their JSON text.
#[must_use]
pub fn form_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        flatten(key.clone(), value, &mut pairs);
    }
    pairs
}

/// Serializes `params` into an urlencoded string.
#[must_use]
pub fn form_encode(params: &Map<String, Value>) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(form_pairs(params))
        .finish()
}

fn flatten(prefix: String, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::String(s) => pairs.push((prefix, s.clone())),
        Value::Bool(b) => pairs.push((prefix, b.to_string())),
        Value::Number(n) => pairs.push((prefix, n.to_string())),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten(format!("{prefix}[{index}]"), item, pairs);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                flatten(format!("{prefix}[{key}]"), item, pairs);
            }
        }
    }
}
