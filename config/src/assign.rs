//! `NAME=VALUE` argument parsing.
//!
//! Turns command-line assignments into a raw record for the validator:
//!
//! - `name=[a; b; c]` becomes the array `["a", "b", "c"]`;
//! - `_json=PATH` merges the JSON object stored at `PATH`;
//! - the first argument without `=` ends the assignment list.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::warn;

use action_schema_core::Record;

use crate::error::{ConfigError, Result};
use crate::loader::read_record;

/// Argument name whose value is a path to a JSON object to merge.
pub const JSON_INCLUDE: &str = "_json";

/// Parses leading `NAME=VALUE` arguments into a raw record.
///
/// Returns the record and the arguments left after the assignments. A
/// `_json` path is looked up as given, then relative to `base_dir`; a path
/// found in neither place is skipped with a warning.
///
/// # Errors
///
/// Returns [`ConfigError::BadAssignment`] for an argument with more than one
/// `=`, or any error from reading an included JSON file.
///
/// # Examples
///
/// ```
/// use action_schema_config::parse_assignments;
/// use serde_json::json;
///
/// let args: Vec<String> = ["isbn=1-2", "authors=[Ann Lee; Bo Ek]", "title"]
///     .iter()
///     .map(|s| s.to_string())
///     .collect();
/// let (record, rest) = parse_assignments(&args, ".").unwrap();
///
/// assert_eq!(record["isbn"], json!("1-2"));
/// assert_eq!(record["authors"], json!(["Ann Lee", "Bo Ek"]));
/// assert_eq!(rest, ["title".to_string()]);
/// ```
pub fn parse_assignments<'a>(
    args: &'a [String],
    base_dir: impl AsRef<Path>,
) -> Result<(Record, &'a [String])> {
    let base_dir = base_dir.as_ref();
    let mut record = Record::new();
    let mut consumed = 0;

    for arg in args {
        let parts: Vec<&str> = arg.trim().split('=').collect();
        let (name, value) = match parts.as_slice() {
            [_] => break,
            [name, value] => (*name, *value),
            _ => return Err(ConfigError::BadAssignment(arg.clone())),
        };

        if name == JSON_INCLUDE {
            if let Some(path) = find_include(value, base_dir) {
                record.extend(read_record(path)?);
            } else {
                warn!(path = value, "cannot find JSON include");
            }
        } else {
            record.insert(name.to_string(), parse_value(value));
        }
        consumed += 1;
    }

    Ok((record, &args[consumed..]))
}

/// Converts bracketed list syntax to an array; other text is kept as is.
///
/// # Examples
///
/// ```
/// use action_schema_config::parse_value;
/// use serde_json::json;
///
/// assert_eq!(parse_value("[a ; b;c ]"), json!(["a", "b", "c"]));
/// assert_eq!(parse_value("plain"), json!("plain"));
/// ```
pub fn parse_value(value: &str) -> Value {
    match value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        Some(inner) => Value::Array(
            inner
                .split(';')
                .map(|item| Value::String(item.trim().to_string()))
                .collect(),
        ),
        None => Value::String(value.to_string()),
    }
}

fn find_include(value: &str, base_dir: &Path) -> Option<PathBuf> {
    let direct = PathBuf::from(value);
    if direct.exists() {
        return Some(direct);
    }
    let relative = base_dir.join(value);
    relative.exists().then_some(relative)
}
