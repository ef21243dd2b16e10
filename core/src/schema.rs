//! Compiled per-action schemas.

use std::collections::HashMap;

use crate::error::{Result, SchemaError};
use crate::rule::{FieldRule, RecordCheck};

/// Field rules of one action, indexed by name.
///
/// Created through [`ActionSchema::builder`]; immutable once built.
///
/// # Examples
///
/// ```
/// use action_schema_core::{ActionSchema, FieldRule};
///
/// let schema = ActionSchema::builder("getCart")
///     .field(FieldRule::new("cartId", "Shopping Cart ID").required())
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.name(), "getCart");
/// assert!(schema.field("cartId").is_some());
/// assert_eq!(schema.required_fields().count(), 1);
/// assert!(!schema.allows_unknown_fields());
/// ```
#[derive(Debug, Clone)]
pub struct ActionSchema {
    name: String,
    fields: Vec<FieldRule>,
    index: HashMap<String, usize>,
    required: Vec<usize>,
    allow_unknown_fields: bool,
    record_check: Option<RecordCheck>,
}

impl ActionSchema {
    /// Starts declaring the schema for `name`.
    pub fn builder(name: impl Into<String>) -> ActionSchemaBuilder {
        ActionSchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
            allow_unknown_fields: false,
            record_check: None,
        }
    }

    /// Action name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field rules in declaration order.
    pub fn fields(&self) -> &[FieldRule] {
        &self.fields
    }

    /// Looks up a field rule by name.
    pub fn field(&self, name: &str) -> Option<&FieldRule> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Required field rules in declaration order.
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldRule> {
        self.required.iter().map(|&i| &self.fields[i])
    }

    /// Whether undeclared fields are tolerated (and dropped).
    pub fn allows_unknown_fields(&self) -> bool {
        self.allow_unknown_fields
    }

    /// Whole-record check, if declared.
    pub fn record_check(&self) -> Option<&RecordCheck> {
        self.record_check.as_ref()
    }
}

/// Declaration-time form of an [`ActionSchema`].
#[derive(Debug, Clone)]
pub struct ActionSchemaBuilder {
    name: String,
    fields: Vec<FieldRule>,
    allow_unknown_fields: bool,
    record_check: Option<RecordCheck>,
}

impl ActionSchemaBuilder {
    /// Appends a field rule.
    pub fn field(mut self, rule: FieldRule) -> Self {
        self.fields.push(rule);
        self
    }

    /// Appends several field rules.
    pub fn fields(mut self, rules: impl IntoIterator<Item = FieldRule>) -> Self {
        self.fields.extend(rules);
        self
    }

    /// Tolerates fields the schema does not declare.
    pub fn allow_unknown_fields(mut self) -> Self {
        self.allow_unknown_fields = true;
        self
    }

    /// Sets whether fields the schema does not declare are tolerated.
    pub fn with_unknown_fields(mut self, allow: bool) -> Self {
        self.allow_unknown_fields = allow;
        self
    }

    /// Sets the whole-record check.
    pub fn record_check(mut self, check: RecordCheck) -> Self {
        self.record_check = Some(check);
        self
    }

    /// Indexes the fields and checks the schema's invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyActionName`] or
    /// [`SchemaError::EmptyFieldName`] for blank names,
    /// [`SchemaError::DuplicateField`] when two fields share a name, and
    /// [`SchemaError::UnknownRecordField`] when the record check names a
    /// field that is not declared.
    pub fn build(self) -> Result<ActionSchema> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::EmptyActionName);
        }

        let mut index = HashMap::with_capacity(self.fields.len());
        let mut required = Vec::new();
        for (i, rule) in self.fields.iter().enumerate() {
            if rule.name.trim().is_empty() {
                return Err(SchemaError::EmptyFieldName(self.name));
            }
            if index.insert(rule.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateField {
                    action: self.name,
                    field: rule.name.clone(),
                });
            }
            if rule.required {
                required.push(i);
            }
        }

        if let Some(check) = &self.record_check {
            if let Some(field) = check
                .referenced_fields()
                .iter()
                .find(|field| !index.contains_key(field.as_str()))
            {
                return Err(SchemaError::UnknownRecordField {
                    action: self.name.clone(),
                    field: field.clone(),
                });
            }
        }

        Ok(ActionSchema {
            name: self.name,
            fields: self.fields,
            index,
            required,
            allow_unknown_fields: self.allow_unknown_fields,
            record_check: self.record_check,
        })
    }
}
