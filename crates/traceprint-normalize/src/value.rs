//! Defensive accessors over untyped provider payloads.
//!
//! Provider APIs rename fields, wrap scalars in `{ "value": ..., "text":
//! ... }` envelopes, and stringify numbers and booleans without notice.
//! Every accessor here degrades to `None` instead of panicking, which is
//! what lets a rule set simply omit a finding when its field is gone.

use serde_json::Value;

/// Look up a value by dot-separated path (`"quality.score"`).
#[must_use]
pub fn get_path<'a>(payload: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = payload;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Read a boolean, tolerating `{ "value": bool }` envelopes and the
/// string forms `"true"` / `"TRUE"` / `"false"` / `"FALSE"`.
#[must_use]
pub fn get_bool(payload: &Value, path: &str) -> Option<bool> {
    let raw = get_path(payload, path)?;
    coerce_bool(raw)
}

fn coerce_bool(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        Value::Object(_) => coerce_bool(raw.get("value")?),
        _ => None,
    }
}

/// Read a number, tolerating numeric strings (`"0.95"`).
#[must_use]
pub fn get_f64(payload: &Value, path: &str) -> Option<f64> {
    let raw = get_path(payload, path)?;
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(_) => match raw.get("value")? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        },
        _ => None,
    }
}

/// Read a non-empty string.
#[must_use]
pub fn get_str<'a>(payload: &'a Value, path: &str) -> Option<&'a str> {
    let s = get_path(payload, path)?.as_str()?;
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Read an array.
#[must_use]
pub fn get_array<'a>(payload: &'a Value, path: &str) -> Option<&'a Vec<Value>> {
    get_path(payload, path)?.as_array()
}

/// Read the first present value among alternate paths.
///
/// Providers occasionally rename fields between API versions; rule sets
/// list the known spellings in preference order.
#[must_use]
pub fn first_of<'a>(payload: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths.iter().find_map(|p| get_path(payload, p))
}

/// Boolean form of [`first_of`].
#[must_use]
pub fn first_bool(payload: &Value, paths: &[&str]) -> Option<bool> {
    paths.iter().find_map(|p| get_bool(payload, p))
}
