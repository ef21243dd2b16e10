//! Structured validation errors and schema construction errors.
//!
//! A validation failure is an expected outcome, not a crash: the validator
//! reports every violation it finds as a [`ModelError`] and hands the whole
//! ordered batch back as [`ValidationErrors`]. Problems with the schemas
//! themselves (duplicate names, bad patterns) are a separate concern and are
//! reported as [`SchemaError`] when a registry is built.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Documented error codes carried by a [`ModelError`].
///
/// # Examples
///
/// ```
/// use action_schema_core::ErrorKind;
///
/// assert_eq!(ErrorKind::BadFieldValue.code(), "BAD_FIELD_VALUE");
/// assert_eq!(ErrorKind::MissingField.to_string(), "MISSING_FIELD");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// No schema is registered for the requested action.
    BadAction,
    /// Field is not declared by the schema and unknown fields are not allowed.
    BadField,
    /// Field is present but its value fails the field's format check.
    BadFieldValue,
    /// One or more required fields are absent.
    MissingField,
    /// The whole-record check failed.
    FormError,
}

impl ErrorKind {
    /// Returns the stable error code string.
    pub fn code(self) -> &'static str {
        match self {
            Self::BadAction => "BAD_ACTION",
            Self::BadField => "BAD_FIELD",
            Self::BadFieldValue => "BAD_FIELD_VALUE",
            Self::MissingField => "MISSING_FIELD",
            Self::FormError => "FORM_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One detected violation.
///
/// `field` is empty for action-level and record-level errors, which makes
/// the rendered form start with a colon.
///
/// # Examples
///
/// ```
/// use action_schema_core::{ErrorKind, ModelError};
///
/// let err = ModelError::for_field(ErrorKind::BadField, "color", "unknown field color");
/// assert_eq!(err.to_string(), "color:BAD_FIELD: unknown field color");
///
/// let err = ModelError::new(ErrorKind::FormError, "nothing to search for");
/// assert_eq!(err.to_string(), ":FORM_ERROR: nothing to search for");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{field}:{kind}: {message}")]
pub struct ModelError {
    /// Error code.
    pub kind: ErrorKind,
    /// Offending field name, or empty.
    #[serde(default)]
    pub field: String,
    /// Descriptive text.
    pub message: String,
}

impl ModelError {
    /// Creates an error that is not tied to a single field.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: String::new(),
            message: message.into(),
        }
    }

    /// Creates an error for a specific field.
    pub fn for_field(
        kind: ErrorKind,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Non-empty, ordered batch of [`ModelError`]s returned by a failed
/// validation.
///
/// The order mirrors the order in which the validator found the problems:
/// per-field errors in input order, then the missing-field error, then the
/// record-level error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ModelError>);

impl ValidationErrors {
    /// Wraps a single error.
    pub fn single(error: ModelError) -> Self {
        Self(vec![error])
    }

    /// Wraps `errors`, returning `None` when there are none.
    pub fn from_vec(errors: Vec<ModelError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    /// All errors, in detection order.
    pub fn errors(&self) -> &[ModelError] {
        &self.0
    }

    /// The first detected error.
    pub fn first(&self) -> &ModelError {
        &self.0[0]
    }

    /// Number of errors (always at least one).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the errors.
    pub fn iter(&self) -> std::slice::Iter<'_, ModelError> {
        self.0.iter()
    }

    /// Error kinds in detection order.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.0.iter().map(|e| e.kind).collect()
    }

    /// Errors reported against `field`.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ModelError> + 'a {
        self.0.iter().filter(move |e| e.field == field)
    }

    /// Unwraps into the underlying vector.
    pub fn into_vec(self) -> Vec<ModelError> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ModelError;
    type IntoIter = std::vec::IntoIter<ModelError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ModelError;
    type IntoIter = std::slice::Iter<'a, ModelError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Errors raised while assembling schemas into a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Action name is empty or whitespace-only.
    #[error("action name cannot be empty")]
    EmptyActionName,
    /// A field in the named action has an empty name.
    #[error("field name cannot be empty in action {0}")]
    EmptyFieldName(String),
    /// Two schemas share an action name.
    #[error("duplicate action: {0}")]
    DuplicateAction(String),
    /// Two fields in one action share a name.
    #[error("duplicate field {field} in action {action}")]
    DuplicateField { action: String, field: String },
    /// A record check refers to a field the action does not declare.
    #[error("record check in action {action} refers to unknown field {field}")]
    UnknownRecordField { action: String, field: String },
    /// A declared pattern is not a valid regular expression.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Convenience alias for results with [`SchemaError`].
pub type Result<T> = std::result::Result<T, SchemaError>;
