//! Field rules and the closed set of checks and transforms they carry.
//!
//! Checks, transforms and record checks are tagged enums interpreted by the
//! validator. Each has a `Custom` variant holding a shared closure for
//! schemas that are defined in code and need logic the built-in variants do
//! not cover.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::schema::ActionSchema;
use crate::value::{Record, is_all_digits, is_blank, parse_number, scalar_text};

/// Custom field check: returns an error message when the value is invalid.
pub type CheckFn = Arc<dyn Fn(&Value, &FieldRule) -> Option<String> + Send + Sync>;

/// Custom value transform.
pub type TransformFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Custom whole-record check: returns an error message when the record is
/// invalid.
pub type RecordCheckFn = Arc<dyn Fn(&Record, &ActionSchema) -> Option<String> + Send + Sync>;

const SINGLE_VALUE: &str = "must specify a single value";
const ARRAY_VALUE: &str = "must specify an array";
const POSITIVE_INTEGER: &str = "must be a positive integer";

/// Format check for a single field.
///
/// Messages are phrased as `The <label> field <expectation>.`
///
/// # Examples
///
/// ```
/// use action_schema_core::{FieldCheck, FieldRule};
/// use regex::Regex;
/// use serde_json::json;
///
/// let check = FieldCheck::matches(Regex::new(r"^\d{4}$").unwrap(), "must specify a 4-digit year");
/// let rule = FieldRule::new("year", "Publication Year").with_check(check);
///
/// assert_eq!(rule.check(&json!("1999")), None);
/// assert_eq!(
///     rule.check(&json!("99")).as_deref(),
///     Some("The Publication Year field must specify a 4-digit year.")
/// );
/// ```
#[derive(Clone)]
pub enum FieldCheck {
    /// The value's text must match `pattern`.
    Matches { pattern: Regex, expectation: String },
    /// The value's text must not contain any match of `pattern`.
    Rejects { pattern: Regex, expectation: String },
    /// The value must be all digits and greater than zero.
    PositiveInteger,
    /// The value must be an array whose entries all pass the inner check.
    ArrayOf(Box<FieldCheck>),
    /// Arbitrary check.
    Custom(CheckFn),
}

impl FieldCheck {
    /// Creates a [`FieldCheck::Matches`].
    pub fn matches(pattern: Regex, expectation: impl Into<String>) -> Self {
        Self::Matches {
            pattern,
            expectation: expectation.into(),
        }
    }

    /// Creates a [`FieldCheck::Rejects`].
    pub fn rejects(pattern: Regex, expectation: impl Into<String>) -> Self {
        Self::Rejects {
            pattern,
            expectation: expectation.into(),
        }
    }

    /// Creates a [`FieldCheck::ArrayOf`].
    pub fn array_of(item: FieldCheck) -> Self {
        Self::ArrayOf(Box::new(item))
    }

    /// Creates a [`FieldCheck::Custom`] from a closure.
    pub fn custom<F>(check: F) -> Self
    where
        F: Fn(&Value, &FieldRule) -> Option<String> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(check))
    }

    /// Runs the check, returning an error message on failure.
    pub fn check(&self, value: &Value, rule: &FieldRule) -> Option<String> {
        match self {
            Self::Matches {
                pattern,
                expectation,
            } => match scalar_text(value) {
                Some(text) if pattern.is_match(&text) => None,
                Some(_) => Some(rule.describe(expectation)),
                None => Some(rule.describe(SINGLE_VALUE)),
            },
            Self::Rejects {
                pattern,
                expectation,
            } => match scalar_text(value) {
                Some(text) if !pattern.is_match(&text) => None,
                Some(_) => Some(rule.describe(expectation)),
                None => Some(rule.describe(SINGLE_VALUE)),
            },
            Self::PositiveInteger => match scalar_text(value) {
                Some(text) if is_all_digits(&text) && text.bytes().any(|b| b != b'0') => None,
                Some(_) => Some(rule.describe(POSITIVE_INTEGER)),
                None => Some(rule.describe(SINGLE_VALUE)),
            },
            Self::ArrayOf(item) => match value {
                Value::Array(entries) => entries.iter().find_map(|entry| item.check(entry, rule)),
                _ => Some(rule.describe(ARRAY_VALUE)),
            },
            Self::Custom(check) => check(value, rule),
        }
    }
}

impl fmt::Debug for FieldCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matches {
                pattern,
                expectation,
            } => f
                .debug_struct("Matches")
                .field("pattern", &pattern.as_str())
                .field("expectation", expectation)
                .finish(),
            Self::Rejects {
                pattern,
                expectation,
            } => f
                .debug_struct("Rejects")
                .field("pattern", &pattern.as_str())
                .field("expectation", expectation)
                .finish(),
            Self::PositiveInteger => f.write_str("PositiveInteger"),
            Self::ArrayOf(item) => f.debug_tuple("ArrayOf").field(item).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Conversion from a validated raw value to its canonical value.
#[derive(Clone)]
pub enum FieldTransform {
    /// Numeric conversion; see [`parse_number`](crate::parse_number).
    /// Arrays and objects become `null`.
    Number,
    /// Arbitrary conversion.
    Custom(TransformFn),
}

impl FieldTransform {
    /// Creates a [`FieldTransform::Custom`] from a closure.
    pub fn custom<F>(transform: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(transform))
    }

    /// Applies the transform.
    pub fn apply(&self, value: &Value) -> Value {
        match self {
            Self::Number => match value {
                Value::Number(_) => value.clone(),
                other => scalar_text(other).map_or(Value::Null, |text| parse_number(&text)),
            },
            Self::Custom(transform) => transform(value),
        }
    }
}

impl fmt::Debug for FieldTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number => f.write_str("Number"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Whole-record invariant, evaluated after every field passed.
#[derive(Clone)]
pub enum RecordCheck {
    /// At least one of `fields` must hold a non-blank value.
    AnyNonBlank { fields: Vec<String>, message: String },
    /// Arbitrary check.
    Custom(RecordCheckFn),
}

impl RecordCheck {
    /// Creates a [`RecordCheck::AnyNonBlank`].
    pub fn any_non_blank<I, S>(fields: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AnyNonBlank {
            fields: fields.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    /// Creates a [`RecordCheck::Custom`] from a closure.
    pub fn custom<F>(check: F) -> Self
    where
        F: Fn(&Record, &ActionSchema) -> Option<String> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(check))
    }

    /// Runs the check against a normalized record.
    pub fn check(&self, record: &Record, schema: &ActionSchema) -> Option<String> {
        match self {
            Self::AnyNonBlank { fields, message } => {
                let satisfied = fields
                    .iter()
                    .filter_map(|name| record.get(name))
                    .any(|value| !is_blank(value));
                (!satisfied).then(|| message.clone())
            }
            Self::Custom(check) => check(record, schema),
        }
    }

    /// Field names this check refers to, if it declares any.
    pub fn referenced_fields(&self) -> &[String] {
        match self {
            Self::AnyNonBlank { fields, .. } => fields,
            Self::Custom(_) => &[],
        }
    }
}

impl fmt::Debug for RecordCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnyNonBlank { fields, message } => f
                .debug_struct("AnyNonBlank")
                .field("fields", fields)
                .field("message", message)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Contract for one field of an action.
///
/// Build with [`FieldRule::new`] and chain the `with_*` methods.
///
/// # Examples
///
/// ```
/// use action_schema_core::{FieldRule, FieldTransform};
/// use serde_json::json;
///
/// let rule = FieldRule::new("nUnits", "Number of Units")
///     .required()
///     .with_transform(FieldTransform::Number);
/// assert!(rule.required);
/// assert_eq!(rule.canonical(&json!("12")), json!(12));
/// ```
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Internal field name, unique within its schema.
    pub name: String,
    /// Display name used in messages.
    pub label: String,
    /// Field must be present in every valid record.
    pub required: bool,
    /// Format check run on non-empty values.
    pub check: Option<FieldCheck>,
    /// Conversion to the canonical value.
    pub transform: Option<FieldTransform>,
}

impl FieldRule {
    /// Creates an optional field with no check and no transform.
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            required: false,
            check: None,
            transform: None,
        }
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the format check.
    pub fn with_check(mut self, check: FieldCheck) -> Self {
        self.check = Some(check);
        self
    }

    /// Sets the value transform.
    pub fn with_transform(mut self, transform: FieldTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Formats a message about this field.
    pub fn describe(&self, expectation: &str) -> String {
        format!("The {} field {expectation}.", self.label)
    }

    /// Runs the format check, if any.
    pub fn check(&self, value: &Value) -> Option<String> {
        self.check.as_ref().and_then(|check| check.check(value, self))
    }

    /// Returns the canonical form of `value`.
    pub fn canonical(&self, value: &Value) -> Value {
        match &self.transform {
            Some(transform) => transform.apply(value),
            None => value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn names() -> FieldRule {
        let item = FieldCheck::rejects(
            Regex::new(r"[^a-zA-Z \-',.]").unwrap(),
            "can contain only letters",
        );
        FieldRule::new("authors", "Author Names").with_check(FieldCheck::array_of(item))
    }

    #[test]
    fn test_array_of_reports_first_bad_entry() {
        let rule = names();
        assert_eq!(rule.check(&json!(["Ann Lee", "O'Brien"])), None);
        assert_eq!(
            rule.check(&json!(["Ann", "R2D2"])).as_deref(),
            Some("The Author Names field can contain only letters.")
        );
    }

    #[test]
    fn test_array_of_rejects_scalar() {
        assert_eq!(
            names().check(&json!("Ann")).as_deref(),
            Some("The Author Names field must specify an array.")
        );
    }

    #[test]
    fn test_scalar_check_rejects_array() {
        let rule = FieldRule::new("isbn", "ISBN")
            .with_check(FieldCheck::matches(Regex::new(r"^\d+$").unwrap(), "must be digits"));
        assert_eq!(
            rule.check(&json!(["1"])).as_deref(),
            Some("The ISBN field must specify a single value.")
        );
    }

    #[test]
    fn test_positive_integer() {
        let rule =
            FieldRule::new("pages", "Number of Pages").with_check(FieldCheck::PositiveInteger);
        assert_eq!(rule.check(&json!("12")), None);
        assert!(rule.check(&json!("0")).is_some());
        assert!(rule.check(&json!("000")).is_some());
        assert!(rule.check(&json!("-4")).is_some());
        assert!(rule.check(&json!("3.5")).is_some());
    }

    #[test]
    fn test_number_transform_of_empty_is_zero() {
        assert_eq!(FieldTransform::Number.apply(&json!("")), json!(0));
        assert_eq!(FieldTransform::Number.apply(&json!(["1"])), Value::Null);
    }

    #[test]
    fn test_custom_check_sees_rule() {
        let rule = FieldRule::new("code", "Code").with_check(FieldCheck::custom(|value, rule| {
            (value != "ok").then(|| rule.describe("must be ok"))
        }));
        assert_eq!(rule.check(&json!("ok")), None);
        assert_eq!(rule.check(&json!("no")).as_deref(), Some("The Code field must be ok."));
    }

    #[test]
    fn test_canonical_without_transform_copies() {
        let rule = FieldRule::new("title", "Book Title");
        assert_eq!(rule.canonical(&json!("T")), json!("T"));
    }
}
