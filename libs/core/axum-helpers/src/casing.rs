//! Key-case conversion for JSON documents.
//!
//! The API speaks camelCase on the wire and snake_case internally. These
//! functions rewrite object keys at every depth, leaving values untouched.
//!
//! Keys that are empty, contain no ASCII alphanumeric character, or are
//! numeric literals are passed through as-is. Leading and trailing
//! underscores are kept (`_id` stays `_id`).
//!
//! Every capital starts a new word, so runs of capitals split letter by
//! letter: `itemURL` becomes `item_u_r_l` and converts back to `itemURL`.
//! Conversion is idempotent per target case, and a camelCase key survives
//! `camel -> snake -> camel` unchanged.
//!
//! If two keys of one object convert to the same name, the later one wins.

use serde_json::{Map, Value};

/// Target naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Snake,
    Camel,
}

impl Case {
    pub fn convert(self, key: &str) -> String {
        match self {
            Case::Snake => to_snake_case(key),
            Case::Camel => to_camel_case(key),
        }
    }
}

/// Rewrite every object key in `value` to `case`.
pub fn convert_keys(value: Value, case: Case) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (case.convert(&key), convert_keys(value, case)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| convert_keys(v, case)).collect())
        }
        scalar => scalar,
    }
}

pub fn to_snake_keys(value: Value) -> Value {
    convert_keys(value, Case::Snake)
}

pub fn to_camel_keys(value: Value) -> Value {
    convert_keys(value, Case::Camel)
}

/// Numeric literal such as `123`, `-7` or `4.5`. Word keys that `f64`
/// also accepts (`NaN`, `Infinity`) do not count.
fn is_numeric(key: &str) -> bool {
    key.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | '.'))
        && key.parse::<f64>().is_ok()
}

fn passes_through(key: &str) -> bool {
    key.is_empty() || !key.chars().any(|c| c.is_ascii_alphanumeric()) || is_numeric(key)
}

/// `zipCode` -> `zip_code`, `itemURL` -> `item_u_r_l`.
pub fn to_snake_case(key: &str) -> String {
    if passes_through(key) || !key.chars().any(char::is_uppercase) {
        return key.to_string();
    }

    let mut out = String::with_capacity(key.len() + 4);
    let mut prev: Option<char> = None;

    for c in key.chars() {
        if c.is_uppercase() && prev.is_some_and(|p| p != '_') {
            out.push('_');
        }
        out.extend(c.to_lowercase());
        prev = Some(c);
    }

    out
}

/// `zip_code` -> `zipCode`, `_id` -> `_id`, `zipCode` -> `zipCode`.
pub fn to_camel_case(key: &str) -> String {
    if passes_through(key) {
        return key.to_string();
    }

    let core = key.trim_matches('_');
    if !core.contains('_') {
        return key.to_string();
    }

    let leading = &key[..key.len() - key.trim_start_matches('_').len()];
    let trailing = &key[key.trim_end_matches('_').len()..];

    let mut out = String::with_capacity(key.len());
    out.push_str(leading);

    let mut segments = core.split('_').filter(|s| !s.is_empty());
    if let Some(first) = segments.next() {
        out.push_str(first);
    }
    for segment in segments {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }

    out.push_str(trailing);
    out
}
