//! Lenient field decoders for generator output.
//!
//! Generators drift from the requested schema: numbers arrive as strings,
//! fields get renamed, lists arrive as single strings. These helpers read
//! what is there and fall back to the caller's default for the rest.

use serde_json::{Map, Value};

/// The first of `names` present in `object` with a non-null value.
pub fn field<'a>(object: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| object.get(*name))
        .find(|value| !value.is_null())
}

/// A confidence in [0, 1]. Accepts numbers, numeric strings and percentages.
/// NaN or non-numeric input yields `default`.
pub fn confidence(value: Option<&Value>, default: f64) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_numeric(s),
        _ => None,
    };
    match parsed {
        Some(v) if !v.is_nan() => v.clamp(0.0, 1.0),
        _ => default,
    }
}

fn parse_numeric(text: &str) -> Option<f64> {
    let text = text.trim();
    match text.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f64>().ok().map(|v| v / 100.0),
        None => text.parse::<f64>().ok(),
    }
}

/// Non-blank strings, trimmed, at most `max`. A lone string counts as one.
pub fn excerpts(value: Option<&Value>, max: usize) -> Vec<String> {
    let items: Vec<&Value> = match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single @ Value::String(_)) => vec![single],
        _ => Vec::new(),
    };
    items
        .into_iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(max)
        .map(str::to_string)
        .collect()
}

/// A trimmed non-blank string, else `default`.
pub fn text(value: Option<&Value>, default: &str) -> String {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// An identifier given as a string or a number.
pub fn identifier(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}
