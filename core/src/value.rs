//! Record representation and value helpers.
//!
//! Raw and canonical records are both [`Record`]s: JSON maps that keep
//! insertion order, so errors can be reported in the order fields were
//! supplied.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Number, Value};

/// Field name to value mapping, in insertion order.
pub type Record = Map<String, Value>;

/// Field names starting with this prefix carry out-of-schema metadata
/// (paging hints and the like) and bypass schema checks.
pub const METADATA_PREFIX: char = '_';

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex must compile"));

/// Normalizes every value of a raw record.
///
/// See [`normalize_value`].
pub fn normalize(raw: &Record) -> Record {
    raw.iter()
        .map(|(name, value)| (name.clone(), normalize_value(value)))
        .collect()
}

/// Normalizes a single raw value.
///
/// `null` becomes the empty string, arrays and objects are kept as they are,
/// and every other scalar is rendered as a string with surrounding
/// whitespace trimmed.
///
/// # Examples
///
/// ```
/// use action_schema_core::normalize_value;
/// use serde_json::json;
///
/// assert_eq!(normalize_value(&json!(null)), json!(""));
/// assert_eq!(normalize_value(&json!("  abc ")), json!("abc"));
/// assert_eq!(normalize_value(&json!(1999)), json!("1999"));
/// assert_eq!(normalize_value(&json!([" a "])), json!([" a "]));
/// ```
pub fn normalize_value(value: &Value) -> Value {
    match value {
        Value::Null => Value::String(String::new()),
        Value::Array(_) | Value::Object(_) => value.clone(),
        Value::String(s) => Value::String(s.trim().to_string()),
        Value::Number(n) => Value::String(render_number(n)),
        Value::Bool(b) => Value::String(b.to_string()),
    }
}

/// Returns the text of a scalar value, or `None` for arrays and objects.
pub fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Null => Some(Cow::Borrowed("")),
        Value::Number(n) => Some(Cow::Owned(render_number(n))),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Renders a JSON number the way it reads in a form field.
///
/// Integral floats drop their fractional part (`1999.0` renders as `1999`);
/// magnitudes at or above `1e21` or below `1e-6` use exponent form
/// (`1e+21`, `1.5e-7`).
pub fn render_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    let Some(f) = n.as_f64() else {
        return n.to_string();
    };
    if f == 0.0 {
        return "0".to_string();
    }
    let magnitude = f.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let text = format!("{f:e}");
        return match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        };
    }
    format!("{f}")
}

/// Returns `true` only for the empty string.
///
/// Arrays, even empty ones, never count as empty.
pub fn is_empty_value(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.is_empty())
}

/// Returns `true` when a value carries no visible content.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        other => scalar_text(other).is_none_or(|text| text.trim().is_empty()),
    }
}

/// Returns `true` when `text` is one or more ASCII digits.
pub fn is_all_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Coerces a metadata value: all-digit text becomes a number, anything else
/// is kept unchanged.
pub fn coerce_metadata(value: &Value) -> Value {
    match value {
        Value::String(s) if is_all_digits(s) => parse_number(s),
        other => other.clone(),
    }
}

/// Converts text to a JSON number.
///
/// Empty text is zero. Integral values become integers, other numeric text
/// becomes a float, and text that is not a finite number becomes `null`.
///
/// # Examples
///
/// ```
/// use action_schema_core::parse_number;
/// use serde_json::json;
///
/// assert_eq!(parse_number(""), json!(0));
/// assert_eq!(parse_number("1999"), json!(1999));
/// assert_eq!(parse_number("2.5"), json!(2.5));
/// assert_eq!(parse_number("many"), json!(null));
/// ```
pub fn parse_number(text: &str) -> Value {
    let text = text.trim();
    if text.is_empty() {
        return Value::Number(Number::from(0));
    }
    if is_all_digits(text) {
        if let Ok(n) = text.parse::<u64>() {
            return Value::Number(Number::from(n));
        }
    }
    if let Ok(n) = text.parse::<i64>() {
        return Value::Number(Number::from(n));
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                Value::Number(Number::from(f as i64))
            } else {
                Number::from_f64(f).map_or(Value::Null, Value::Number)
            }
        }
        _ => Value::Null,
    }
}

/// Renders a value for use inside a message.
///
/// Arrays are rendered as their entries joined by commas.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(render_value).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
        other => scalar_text(other).map(Cow::into_owned).unwrap_or_default(),
    }
}

/// Replaces every run of whitespace in `message` with a single space.
pub fn collapse_whitespace(message: &str) -> String {
    WHITESPACE_RUN.replace_all(message, " ").into_owned()
}
