//! Built-in schemas for the bookstore and shopping-cart actions.

use std::sync::LazyLock;

use regex::Regex;

use crate::registry::SchemaRegistry;
use crate::rule::{FieldCheck, FieldRule, FieldTransform, RecordCheck};
use crate::schema::ActionSchema;

static ISBN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(-\d+)*$").expect("static regex must compile"));
static NAME_FORBIDDEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z \-',.]").expect("static regex must compile"));
static NO_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+$").expect("static regex must compile"));
static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("static regex must compile"));
static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}$").expect("static regex must compile"));

fn isbn_check() -> FieldCheck {
    FieldCheck::matches(
        ISBN.clone(),
        "must consist of one-or-more digits separated by '-'",
    )
}

fn name_check() -> FieldCheck {
    FieldCheck::rejects(
        NAME_FORBIDDEN.clone(),
        "can contain only alphabetic characters or space, hyphen, quote, comma and period characters",
    )
}

fn id_check() -> FieldCheck {
    FieldCheck::matches(NO_WHITESPACE.clone(), "cannot contain whitespace")
}

fn schemas() -> crate::Result<Vec<ActionSchema>> {
    Ok(vec![
        ActionSchema::builder("newCart").build()?,
        ActionSchema::builder("getCart")
            .field(
                FieldRule::new("cartId", "Shopping Cart ID")
                    .required()
                    .with_check(id_check()),
            )
            .build()?,
        ActionSchema::builder("cartItem")
            .allow_unknown_fields()
            .field(FieldRule::new("cartId", "Cart ID").required().with_check(id_check()))
            .field(FieldRule::new("sku", "SKU").required().with_check(id_check()))
            .field(
                FieldRule::new("nUnits", "Number of Units")
                    .required()
                    .with_check(FieldCheck::matches(INTEGER.clone(), "must be an integer"))
                    .with_transform(FieldTransform::Number),
            )
            .build()?,
        ActionSchema::builder("addBook")
            .allow_unknown_fields()
            .field(FieldRule::new("isbn", "ISBN").required().with_check(isbn_check()))
            .field(FieldRule::new("title", "Book Title").required())
            .field(
                FieldRule::new("authors", "Author Names")
                    .required()
                    .with_check(FieldCheck::array_of(name_check())),
            )
            .field(FieldRule::new("publisher", "Publisher").required().with_check(name_check()))
            .field(
                FieldRule::new("year", "Publication Year")
                    .required()
                    .with_check(FieldCheck::matches(YEAR.clone(), "must specify a 4-digit year"))
                    .with_transform(FieldTransform::Number),
            )
            .field(
                FieldRule::new("pages", "Number of Pages")
                    .with_check(FieldCheck::PositiveInteger)
                    .with_transform(FieldTransform::Number),
            )
            .build()?,
        ActionSchema::builder("findBooks")
            .field(FieldRule::new("isbn", "ISBN").with_check(isbn_check()))
            .field(FieldRule::new("authorsTitleSearch", "Author or Title Words"))
            .record_check(RecordCheck::any_non_blank(
                ["isbn", "authorsTitleSearch"],
                "At least one search field must be specified.",
            ))
            .build()?,
    ])
}

impl SchemaRegistry {
    /// Registry holding the built-in bookstore actions: `newCart`,
    /// `getCart`, `cartItem`, `addBook` and `findBooks`.
    ///
    /// # Examples
    ///
    /// ```
    /// use action_schema_core::SchemaRegistry;
    ///
    /// let registry = SchemaRegistry::bookstore();
    /// let add_book = registry.schema_for("addBook").unwrap();
    /// assert!(add_book.allows_unknown_fields());
    /// assert_eq!(add_book.required_fields().count(), 5);
    /// ```
    pub fn bookstore() -> Self {
        schemas()
            .and_then(|schemas| SchemaRegistry::builder().actions(schemas).build())
            .expect("built-in bookstore schemas must be well formed")
    }
}
