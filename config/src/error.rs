//! Error types for schema files and record loading.
//!
//! Covers I/O, JSON and YAML failures, schema compilation problems, and
//! malformed `NAME=VALUE` arguments.

use action_schema_core::SchemaError;
use thiserror::Error;

/// Errors that can occur while loading schemas or raw records.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure (including gzip decoding).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Declarations do not form a valid registry.
    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),

    /// A rule built from a closure cannot be written to a schema file.
    #[error("cannot export custom {rule} in action {action}")]
    UnexportableRule { action: String, rule: String },

    /// A `NAME=VALUE` argument could not be parsed.
    #[error("bad NAME=VALUE argument '{0}'")]
    BadAssignment(String),

    /// A data file did not hold the expected shape.
    #[error("invalid records: {0}")]
    InvalidRecords(String),
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;
