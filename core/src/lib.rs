//! Schema model and batch validator for action records.
//!
//! An *action* names an operation category ("add a book", "update a cart
//! item"). Each action has an [`ActionSchema`] describing its fields, and a
//! [`Validator`] checks flat raw records against those schemas:
//!
//! - [`FieldRule`] — one field's label, required flag, [`FieldCheck`] and
//!   [`FieldTransform`].
//! - [`ActionSchema`] — the field rules of one action, the unknown-field
//!   policy and an optional [`RecordCheck`].
//! - [`SchemaRegistry`] — the fixed set of schemas, built once.
//! - [`Validator`] — evaluates records and returns either the canonical
//!   record or every [`ModelError`] found, as [`ValidationErrors`].
//!
//! # Example
//!
//! ```
//! use action_schema_core::*;
//! use serde_json::json;
//!
//! let validator = Validator::bookstore();
//! let raw: Record = json!({
//!     "isbn": "1-2-3",
//!     "title": "T",
//!     "authors": ["A B"],
//!     "publisher": "P",
//!     "year": "1999",
//! })
//! .as_object()
//! .unwrap()
//! .clone();
//!
//! let book = validator.validate("addBook", &raw).unwrap();
//! assert_eq!(book["year"], json!(1999));
//!
//! let mut bad = raw.clone();
//! bad.insert("isbn".into(), json!("abc"));
//! let errors = validator.validate("addBook", &bad).unwrap_err();
//! assert_eq!(errors.first().kind, ErrorKind::BadFieldValue);
//! ```

mod bookstore;
mod error;
mod registry;
mod rule;
mod schema;
mod validator;
mod value;

pub use error::{ErrorKind, ModelError, Result, SchemaError, ValidationErrors};
pub use registry::{RegistryBuilder, SchemaRegistry};
pub use rule::{
    CheckFn, FieldCheck, FieldRule, FieldTransform, RecordCheck, RecordCheckFn, TransformFn,
};
pub use schema::{ActionSchema, ActionSchemaBuilder};
pub use validator::Validator;
pub use value::{
    METADATA_PREFIX, Record, coerce_metadata, collapse_whitespace, is_all_digits, is_blank,
    is_empty_value, normalize, normalize_value, parse_number, render_number, render_value,
    scalar_text,
};
