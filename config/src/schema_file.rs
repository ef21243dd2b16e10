//! Declarative schema files.
//!
//! A schema file lists actions and their field rules as plain data and is
//! compiled into a [`SchemaRegistry`]. Only the data-expressible checks are
//! available here; closures stay in code.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! actions:
//!   - name: getCart
//!     fields:
//!       - name: cartId
//!         label: Shopping Cart ID
//!         required: true
//!         check:
//!           kind: matches
//!           pattern: '^\S+$'
//!           expectation: cannot contain whitespace
//!   - name: findBooks
//!     fields:
//!       - name: isbn
//!         label: ISBN
//!       - name: authorsTitleSearch
//!         label: Author or Title Words
//!     record_check:
//!       kind: any_non_blank
//!       fields: [isbn, authorsTitleSearch]
//!       message: At least one search field must be specified.
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use action_schema_core::{
    ActionSchema, FieldCheck, FieldRule, FieldTransform, RecordCheck, SchemaError, SchemaRegistry,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};

/// Format check declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckDecl {
    /// Value text must match `pattern`.
    Matches { pattern: String, expectation: String },
    /// Value text must not contain a match of `pattern`.
    Rejects { pattern: String, expectation: String },
    /// Value must be a positive integer.
    PositiveInteger,
    /// Value must be an array whose entries pass `item`.
    ArrayOf { item: Box<CheckDecl> },
}

/// Value transform declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformDecl {
    /// Convert to a number.
    Number,
}

/// Whole-record check declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordCheckDecl {
    /// At least one of `fields` must be non-blank.
    AnyNonBlank { fields: Vec<String>, message: String },
}

/// One field of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Internal field name.
    pub name: String,
    /// Display name used in messages.
    pub label: String,
    /// Whether the field must be present.
    #[serde(default)]
    pub required: bool,
    /// Optional format check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<CheckDecl>,
    /// Optional value transform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<TransformDecl>,
}

/// One action and its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDecl {
    /// Action name.
    pub name: String,
    /// Tolerate (and drop) undeclared fields.
    #[serde(default)]
    pub allow_unknown_fields: bool,
    /// Field declarations, in order.
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    /// Optional whole-record check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_check: Option<RecordCheckDecl>,
}

/// Top-level schema document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaFile {
    /// Document format version (e.g. `"1.0"`).
    pub version: String,
    /// ISO-8601 timestamp of when the file was generated, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    /// Action declarations.
    #[serde(default)]
    pub actions: Vec<ActionDecl>,
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    )
}

impl SchemaFile {
    /// Loads a schema file; `.yml`/`.yaml` files are read as YAML, anything
    /// else as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ConfigError::IoError) if the file cannot be read,
    /// or [`YamlError`](ConfigError::YamlError) /
    /// [`JsonError`](ConfigError::JsonError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let file: Self = if is_yaml(path) {
            serde_yaml::from_reader(reader)?
        } else {
            serde_json::from_reader(reader)?
        };
        debug!(path = %path.display(), actions = file.actions.len(), "loaded schema file");
        Ok(file)
    }

    /// Saves the schema file, choosing the format from the extension as
    /// [`load`](Self::load) does.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ConfigError::IoError) if the file cannot be
    /// written, or a serialization error.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(std::fs::File::create(path)?);
        if is_yaml(path) {
            serde_yaml::to_writer(writer, self)?;
        } else {
            serde_json::to_writer_pretty(writer, self)?;
        }
        Ok(())
    }

    /// Compiles the declarations into a registry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Schema`] for invalid patterns, blank or
    /// duplicate names, and record checks naming undeclared fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use action_schema_config::SchemaFile;
    ///
    /// let yaml = r#"
    /// version: "1.0"
    /// actions:
    ///   - name: newCart
    /// "#;
    /// let file: SchemaFile = serde_yaml::from_str(yaml).unwrap();
    /// let registry = file.to_registry().unwrap();
    /// assert!(registry.contains("newCart"));
    /// ```
    pub fn to_registry(&self) -> Result<SchemaRegistry> {
        let schemas = self
            .actions
            .iter()
            .map(ActionDecl::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(SchemaRegistry::builder().actions(schemas).build()?)
    }

    /// Describes every schema of `registry` as declarations.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnexportableRule`] if any check, transform or
    /// record check is a custom closure.
    pub fn from_registry(registry: &SchemaRegistry, version: impl Into<String>) -> Result<Self> {
        let actions = registry
            .iter()
            .map(ActionDecl::from_schema)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            version: version.into(),
            generated_at: None,
            actions,
        })
    }
}

impl ActionDecl {
    /// Compiles this declaration into an [`ActionSchema`].
    pub fn compile(&self) -> Result<ActionSchema> {
        let fields = self
            .fields
            .iter()
            .map(FieldDecl::compile)
            .collect::<Result<Vec<_>>>()?;

        let mut builder = ActionSchema::builder(self.name.clone())
            .fields(fields)
            .with_unknown_fields(self.allow_unknown_fields);
        if let Some(RecordCheckDecl::AnyNonBlank { fields, message }) = &self.record_check {
            builder = builder.record_check(RecordCheck::any_non_blank(
                fields.iter().cloned(),
                message.clone(),
            ));
        }
        Ok(builder.build()?)
    }

    /// Describes a compiled schema.
    pub fn from_schema(schema: &ActionSchema) -> Result<Self> {
        let unexportable = |rule: &str| ConfigError::UnexportableRule {
            action: schema.name().to_string(),
            rule: rule.to_string(),
        };

        let fields = schema
            .fields()
            .iter()
            .map(|rule| {
                FieldDecl::from_rule(rule)
                    .ok_or_else(|| unexportable(&format!("rule for field {}", rule.name)))
            })
            .collect::<Result<Vec<_>>>()?;

        let record_check = match schema.record_check() {
            None => None,
            Some(RecordCheck::AnyNonBlank { fields, message }) => {
                Some(RecordCheckDecl::AnyNonBlank {
                    fields: fields.clone(),
                    message: message.clone(),
                })
            }
            Some(RecordCheck::Custom(_)) => return Err(unexportable("record check")),
        };

        Ok(Self {
            name: schema.name().to_string(),
            allow_unknown_fields: schema.allows_unknown_fields(),
            fields,
            record_check,
        })
    }
}

impl FieldDecl {
    /// Compiles this declaration into a [`FieldRule`].
    pub fn compile(&self) -> Result<FieldRule> {
        let mut rule = FieldRule::new(self.name.clone(), self.label.clone());
        rule.required = self.required;
        if let Some(check) = &self.check {
            rule = rule.with_check(check.compile()?);
        }
        if let Some(TransformDecl::Number) = self.transform {
            rule = rule.with_transform(FieldTransform::Number);
        }
        Ok(rule)
    }

    /// Describes a field rule, or `None` if it holds a custom closure.
    pub fn from_rule(rule: &FieldRule) -> Option<Self> {
        let check = match &rule.check {
            Some(check) => Some(CheckDecl::from_check(check)?),
            None => None,
        };
        let transform = match &rule.transform {
            Some(FieldTransform::Number) => Some(TransformDecl::Number),
            Some(FieldTransform::Custom(_)) => return None,
            None => None,
        };
        Some(Self {
            name: rule.name.clone(),
            label: rule.label.clone(),
            required: rule.required,
            check,
            transform,
        })
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|err| {
        ConfigError::Schema(SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: err.to_string(),
        })
    })
}

impl CheckDecl {
    /// Compiles this declaration into a [`FieldCheck`].
    pub fn compile(&self) -> Result<FieldCheck> {
        Ok(match self {
            Self::Matches {
                pattern,
                expectation,
            } => FieldCheck::matches(compile_pattern(pattern)?, expectation.clone()),
            Self::Rejects {
                pattern,
                expectation,
            } => FieldCheck::rejects(compile_pattern(pattern)?, expectation.clone()),
            Self::PositiveInteger => FieldCheck::PositiveInteger,
            Self::ArrayOf { item } => FieldCheck::array_of(item.compile()?),
        })
    }

    /// Describes a check, or `None` if it is (or wraps) a custom closure.
    pub fn from_check(check: &FieldCheck) -> Option<Self> {
        Some(match check {
            FieldCheck::Matches {
                pattern,
                expectation,
            } => Self::Matches {
                pattern: pattern.as_str().to_string(),
                expectation: expectation.clone(),
            },
            FieldCheck::Rejects {
                pattern,
                expectation,
            } => Self::Rejects {
                pattern: pattern.as_str().to_string(),
                expectation: expectation.clone(),
            },
            FieldCheck::PositiveInteger => Self::PositiveInteger,
            FieldCheck::ArrayOf(item) => Self::ArrayOf {
                item: Box::new(Self::from_check(item)?),
            },
            FieldCheck::Custom(_) => return None,
        })
    }
}
