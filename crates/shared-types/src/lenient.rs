//! Coercing deserializers for client-supplied score payloads.
//!
//! Clients are not trusted to send well-typed JSON. Instead of rejecting a
//! request, each field is coerced the way a loosely typed client would read
//! it: `null` is false, `"12"` is twelve, an array where an object was
//! expected is an empty map.

use crate::entities::HeaderSet;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Truthiness of an arbitrary JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numeric reading of a latency sample; unreadable values count as zero.
pub fn as_sample(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.filter(|f| f.is_finite()).unwrap_or(0.0)
}

/// String rendering of a header value.
fn as_header_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(is_truthy(&Value::deserialize(deserializer)?))
}

pub fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// `None` unless the value is an array; elements go through [`as_sample`].
pub fn samples<'de, D>(deserializer: D) -> Result<Option<Vec<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(items.iter().map(as_sample).collect()),
        _ => None,
    })
}

/// Empty unless the value is an object; keys are lowercased.
pub fn header_map<'de, D>(deserializer: D) -> Result<HeaderSet, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), as_header_value(v)))
            .collect(),
        _ => HeaderSet::new(),
    })
}
