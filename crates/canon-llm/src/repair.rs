//! Turn near-JSON generator output into a JSON value of the expected shape.
//!
//! Handles code fences, prose around the payload, smart quotes, trailing
//! commas, and a single-field wrapper object around an expected array.
//! Output that still does not parse is `LlmError::Malformed`; it is never
//! retried.

use std::sync::OnceLock;

use canon_core::errors::LlmError;
use canon_core::traits::ExpectedShape;
use regex::Regex;
use serde_json::Value;

/// Maximum embedded candidates tried per opener before giving up.
const MAX_EMBEDDED_CANDIDATES: usize = 8;

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n?(.*?)```").expect("fence regex is valid")
    })
}

/// Decode `raw` as JSON of the given `shape`, repairing what can be repaired.
pub fn repair_json(raw: &str, shape: ExpectedShape) -> Result<Value, LlmError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(LlmError::Malformed {
            reason: "empty output".to_string(),
        });
    }

    // Output that is already valid JSON is decoded as-is; a wrong shape there is an error.
    let unfenced = strip_code_fence(text);
    let direct: Vec<&str> = std::iter::once(text).chain(unfenced.as_deref()).collect();
    for candidate in &direct {
        for variant in [candidate.to_string(), fix_syntax(candidate)] {
            if let Ok(value) = serde_json::from_str::<Value>(&variant) {
                return coerce_shape(value, shape).ok_or_else(|| LlmError::Malformed {
                    reason: format!("expected a JSON {}", shape_name(shape)),
                });
            }
        }
    }

    let body = normalize_quotes(unfenced.as_deref().unwrap_or(text));
    for candidate in embedded_candidates(&body, shape) {
        for variant in [candidate.clone(), remove_trailing_commas(&candidate)] {
            if let Ok(value) = serde_json::from_str::<Value>(&variant) {
                if let Some(value) = coerce_shape(value, shape) {
                    return Ok(value);
                }
            }
        }
    }

    Err(LlmError::Malformed {
        reason: format!("no JSON {} found in output", shape_name(shape)),
    })
}

fn shape_name(shape: ExpectedShape) -> &'static str {
    match shape {
        ExpectedShape::Object => "object",
        ExpectedShape::Array => "array",
    }
}

/// Balanced spans embedded in prose, expected shape first.
fn embedded_candidates(text: &str, shape: ExpectedShape) -> Vec<String> {
    let (primary, secondary) = match shape {
        ExpectedShape::Object => (('{', '}'), ('[', ']')),
        ExpectedShape::Array => (('[', ']'), ('{', '}')),
    };
    let mut out = embedded(text, primary.0, primary.1);
    out.extend(embedded(text, secondary.0, secondary.1));
    out
}

/// Contents of the first fenced block, or of an unterminated fence.
fn strip_code_fence(text: &str) -> Option<String> {
    if let Some(caps) = fence_regex().captures(text) {
        return caps.get(1).map(|m| m.as_str().trim().to_string());
    }
    let rest = text.strip_prefix("```")?;
    let after_tag = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    Some(after_tag.trim().to_string())
}

fn normalize_quotes(text: &str) -> String {
    text.replace(['\u{201C}', '\u{201D}', '\u{201E}', '\u{201F}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
}

/// Smart quotes plus trailing commas.
fn fix_syntax(text: &str) -> String {
    remove_trailing_commas(&normalize_quotes(text))
}

/// Balanced `open … close` spans, each starting at a successive `open`.
fn embedded(text: &str, open: char, close: char) -> Vec<String> {
    text.char_indices()
        .filter(|(_, c)| *c == open)
        .filter_map(|(start, _)| balanced_end(text, start, open, close).map(|end| (start, end)))
        .take(MAX_EMBEDDED_CANDIDATES)
        .map(|(start, end)| text[start..end].to_string())
        .collect()
}

/// Byte index just past the `close` matching the `open` at `start`.
/// String contents and escapes are skipped.
fn balanced_end(text: &str, start: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// Drops commas directly followed (ignoring whitespace) by `}` or `]`.
fn remove_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            out.push(c);
            continue;
        }
        if c == '"' {
            in_string = true;
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

fn coerce_shape(value: Value, shape: ExpectedShape) -> Option<Value> {
    match (shape, value) {
        (ExpectedShape::Object, Value::Object(map)) => Some(Value::Object(map)),
        (ExpectedShape::Object, Value::Array(mut items))
            if items.len() == 1 && items[0].is_object() =>
        {
            items.pop()
        }
        (ExpectedShape::Array, Value::Array(items)) => Some(Value::Array(items)),
        (ExpectedShape::Array, Value::Object(map)) if map.len() == 1 => {
            map.into_iter().next().and_then(|(_, inner)| match inner {
                Value::Array(items) => Some(Value::Array(items)),
                _ => None,
            })
        }
        _ => None,
    }
}
