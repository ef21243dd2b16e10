//! The set of action schemas known to a validator.
//!
//! A [`SchemaRegistry`] is assembled once through [`RegistryBuilder`] and is
//! read-only afterwards, so it can be shared across threads without locking.

use std::collections::BTreeMap;

use crate::error::{Result, SchemaError};
use crate::schema::ActionSchema;

/// Immutable mapping from action name to [`ActionSchema`].
///
/// # Examples
///
/// ```
/// use action_schema_core::{ActionSchema, FieldRule, SchemaRegistry};
///
/// let registry = SchemaRegistry::builder()
///     .action(ActionSchema::builder("newCart").build().unwrap())
///     .action(
///         ActionSchema::builder("getCart")
///             .field(FieldRule::new("cartId", "Shopping Cart ID").required())
///             .build()
///             .unwrap(),
///     )
///     .build()
///     .unwrap();
///
/// assert_eq!(registry.len(), 2);
/// assert!(registry.schema_for("getCart").is_some());
/// assert!(registry.schema_for("deleteCart").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, ActionSchema>,
}

impl SchemaRegistry {
    /// Returns a new [`RegistryBuilder`].
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Looks up the schema for `action`.
    pub fn schema_for(&self, action: &str) -> Option<&ActionSchema> {
        self.schemas.get(action)
    }

    /// Returns `true` if a schema is registered for `action`.
    pub fn contains(&self, action: &str) -> bool {
        self.schemas.contains_key(action)
    }

    /// Registered action names, sorted.
    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Registered schemas, sorted by action name.
    pub fn iter(&self) -> impl Iterator<Item = &ActionSchema> {
        self.schemas.values()
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns `true` if no actions are registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// Collects schemas and checks them for duplicates.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    schemas: Vec<ActionSchema>,
}

impl RegistryBuilder {
    /// Adds a schema.
    pub fn action(mut self, schema: ActionSchema) -> Self {
        self.schemas.push(schema);
        self
    }

    /// Adds several schemas.
    pub fn actions(mut self, schemas: impl IntoIterator<Item = ActionSchema>) -> Self {
        self.schemas.extend(schemas);
        self
    }

    /// Builds the registry.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateAction`] if two schemas share a name.
    pub fn build(self) -> Result<SchemaRegistry> {
        let mut schemas = BTreeMap::new();
        for schema in self.schemas {
            let name = schema.name().to_string();
            if schemas.contains_key(&name) {
                return Err(SchemaError::DuplicateAction(name));
            }
            schemas.insert(name, schema);
        }
        Ok(SchemaRegistry { schemas })
    }
}
