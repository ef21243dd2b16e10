//! Batch validation of raw records against action schemas.
//!
//! [`Validator::validate`] runs every check in one pass and reports all
//! violations together, so a caller can present a complete list instead of
//! one error per round trip. The pass is:
//!
//! 1. normalize the raw record (trim scalars, `null` to `""`);
//! 2. look up the action, failing with a lone `BAD_ACTION` if unknown;
//! 3. check each input field in input order;
//! 4. report absent required fields in one `MISSING_FIELD` error;
//! 5. if nothing failed so far, run the record check on the normalized input.
//!
//! # Examples
//!
//! ```
//! use action_schema_core::{ErrorKind, Record, Validator};
//! use serde_json::json;
//!
//! let validator = Validator::bookstore();
//! let raw: Record = json!({"cartId": " c1 ", "sku": "sku-9", "nUnits": "3"})
//!     .as_object()
//!     .unwrap()
//!     .clone();
//!
//! let canonical = validator.validate("cartItem", &raw).unwrap();
//! assert_eq!(canonical["cartId"], json!("c1"));
//! assert_eq!(canonical["nUnits"], json!(3));
//!
//! let errors = validator.validate("dropCart", &raw).unwrap_err();
//! assert_eq!(errors.kinds(), vec![ErrorKind::BadAction]);
//! ```

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::error::{ErrorKind, ModelError, ValidationErrors};
use crate::registry::SchemaRegistry;
use crate::rule::FieldRule;
use crate::value::{
    METADATA_PREFIX, Record, coerce_metadata, collapse_whitespace, is_empty_value, normalize,
    render_value,
};

/// Evaluates raw records against the schemas of a [`SchemaRegistry`].
///
/// Cloning is cheap; clones share the registry.
#[derive(Debug, Clone)]
pub struct Validator {
    registry: Arc<SchemaRegistry>,
}

impl Validator {
    /// Creates a validator over `registry`.
    pub fn new(registry: impl Into<Arc<SchemaRegistry>>) -> Self {
        Self {
            registry: registry.into(),
        }
    }

    /// Creates a validator over [`SchemaRegistry::bookstore`].
    pub fn bookstore() -> Self {
        Self::new(SchemaRegistry::bookstore())
    }

    /// The registry this validator evaluates against.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Validates `raw` against the schema for `action`.
    ///
    /// Returns the canonical record: declared fields passed through their
    /// transforms, metadata fields with numeric coercion, unknown fields
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns every detected violation, in detection order. An unknown
    /// action yields a single `BAD_ACTION` error and nothing else is checked.
    pub fn validate(&self, action: &str, raw: &Record) -> Result<Record, ValidationErrors> {
        let input = normalize(raw);

        let Some(schema) = self.registry.schema_for(action) else {
            debug!(action, "rejected record for unknown action");
            return Err(ValidationErrors::single(ModelError::new(
                ErrorKind::BadAction,
                format!("bad action {action}"),
            )));
        };

        let mut errors = Vec::new();
        let mut output = Record::new();
        let mut pending: Vec<&FieldRule> = schema.required_fields().collect();

        for (name, value) in &input {
            pending.retain(|rule| rule.name != *name);

            if name.starts_with(METADATA_PREFIX) {
                output.insert(name.clone(), coerce_metadata(value));
                continue;
            }

            let Some(rule) = schema.field(name) else {
                if !schema.allows_unknown_fields() {
                    errors.push(ModelError::for_field(
                        ErrorKind::BadField,
                        name.as_str(),
                        format!("unknown field {name} for action {action}"),
                    ));
                }
                continue;
            };

            let failure = if is_empty_value(value) {
                None
            } else {
                rule.check(value)
            };
            match failure {
                Some(message) => errors.push(ModelError::for_field(
                    ErrorKind::BadFieldValue,
                    name.as_str(),
                    format!(
                        "bad value: \"{}\": {}",
                        render_value(value),
                        collapse_whitespace(&message)
                    ),
                )),
                None => {
                    output.insert(name.clone(), rule.canonical(value));
                }
            }
        }

        if !pending.is_empty() {
            let labels = pending
                .iter()
                .map(|rule| format!("\"{}\"", rule.label))
                .collect::<Vec<_>>()
                .join(", ");
            errors.push(ModelError::new(
                ErrorKind::MissingField,
                format!("missing fields {labels}."),
            ));
        }

        if let Some(check) = schema.record_check() {
            if errors.is_empty() {
                if let Some(message) = check.check(&input, schema) {
                    errors.push(ModelError::new(ErrorKind::FormError, message));
                }
            } else {
                trace!(action, "skipped record check after field errors");
            }
        }

        match ValidationErrors::from_vec(errors) {
            Some(errors) => {
                debug!(action, errors = errors.len(), "record failed validation");
                Err(errors)
            }
            None => {
                trace!(action, fields = output.len(), "record validated");
                Ok(output)
            }
        }
    }

    /// Validates each record independently against the same action.
    ///
    /// Records are checked in parallel; results are returned in input order.
    pub fn validate_many(
        &self,
        action: &str,
        records: &[Record],
    ) -> Vec<Result<Record, ValidationErrors>> {
        records
            .par_iter()
            .map(|record| self.validate(action, record))
            .collect()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::bookstore()
    }
}
