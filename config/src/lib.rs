//! Declarative schema files and raw record loading.
//!
//! This crate sits between the outside world and
//! [`action_schema_core::Validator`]:
//!
//! - [`SchemaFile`] loads YAML/JSON schema declarations and compiles them
//!   into a [`SchemaRegistry`](action_schema_core::SchemaRegistry), or
//!   exports an existing registry.
//! - [`parse_assignments`] turns `NAME=VALUE` arguments into a raw record,
//!   expanding `[a; b]` lists and `_json=PATH` includes.
//! - [`load_records`] and [`read_json`] read record files, gzipped or not.
//!
//! # Quick start
//!
//! ```no_run
//! use action_schema_config::{SchemaFile, load_records};
//! use action_schema_core::Validator;
//!
//! let registry = SchemaFile::load("schemas.yml").unwrap().to_registry().unwrap();
//! let validator = Validator::new(registry);
//! for record in load_records("books.json").unwrap() {
//!     match validator.validate("addBook", &record) {
//!         Ok(book) => println!("{}", serde_json::Value::Object(book)),
//!         Err(errors) => eprintln!("{errors}"),
//!     }
//! }
//! ```

mod assign;
mod error;
mod loader;
mod schema_file;

pub use assign::{JSON_INCLUDE, parse_assignments, parse_value};
pub use error::{ConfigError, Result};
pub use loader::{load_records, read_json, read_record};
pub use schema_file::{
    ActionDecl, CheckDecl, FieldDecl, RecordCheckDecl, SchemaFile, TransformDecl,
};
