use std::sync::Arc;
use std::thread;

use action_schema_core::{
    ActionSchema, ErrorKind, FieldCheck, FieldRule, Record, RecordCheck, SchemaRegistry, Validator,
};
use regex::Regex;
use serde_json::{Value, json};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

/// Valid values for every required field of the built-in actions.
fn required_only(action: &str) -> Record {
    match action {
        "newCart" => Record::new(),
        "getCart" => record(json!({"cartId": "cart-1"})),
        "cartItem" => record(json!({"cartId": "cart-1", "sku": "sku-7", "nUnits": "2"})),
        "addBook" => record(json!({
            "isbn": "978-1",
            "title": "The Art",
            "authors": ["Knuth, Donald E."],
            "publisher": "Addison-Wesley",
            "year": "1968",
        })),
        "findBooks" => Record::new(),
        other => panic!("no sample for action {other}"),
    }
}

/// Renders a canonical record back to the raw string form a caller would send.
fn to_raw(canonical: &Record) -> Record {
    canonical
        .iter()
        .map(|(name, value)| {
            let raw = match value {
                Value::Number(n) => Value::String(n.to_string()),
                other => other.clone(),
            };
            (name.clone(), raw)
        })
        .collect()
}

fn strict_and_lenient() -> Validator {
    let fields = || {
        vec![
            FieldRule::new("code", "Code").required().with_check(FieldCheck::matches(
                Regex::new(r"^[A-Z]+$").unwrap(),
                "must be upper case",
            )),
        ]
    };
    let registry = SchemaRegistry::builder()
        .action(ActionSchema::builder("strict").fields(fields()).build().unwrap())
        .action(
            ActionSchema::builder("lenient")
                .fields(fields())
                .allow_unknown_fields()
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    Validator::new(registry)
}

// ---------------------------------------------------------------------------
// Registered actions
// ---------------------------------------------------------------------------

#[test]
fn test_required_only_records_validate_for_every_schema_without_record_check() {
    let validator = Validator::bookstore();
    for schema in validator.registry().iter() {
        if schema.record_check().is_some() {
            continue;
        }
        let raw = required_only(schema.name());
        let out = validator
            .validate(schema.name(), &raw)
            .unwrap_or_else(|e| panic!("{} failed: {e}", schema.name()));

        let mut expected: Vec<_> = raw.keys().cloned().collect();
        let mut actual: Vec<_> = out.keys().cloned().collect();
        expected.sort();
        actual.sort();
        assert_eq!(actual, expected, "fields of {}", schema.name());
    }
}

#[test]
fn test_omitting_any_required_field_yields_one_missing_error() {
    let validator = Validator::bookstore();
    for schema in validator.registry().iter() {
        for rule in schema.required_fields() {
            let mut raw = required_only(schema.name());
            raw.remove(&rule.name);

            let errors = validator.validate(schema.name(), &raw).unwrap_err();
            assert_eq!(errors.kinds(), vec![ErrorKind::MissingField]);
            assert!(
                errors.first().message.contains(&format!("\"{}\"", rule.label)),
                "message {:?} should name {}",
                errors.first().message,
                rule.label
            );
        }
    }
}

#[test]
fn test_canonical_output_revalidates_to_same_record() {
    let validator = Validator::bookstore();
    let mut raw = required_only("addBook");
    raw.insert("pages".into(), json!(" 412 "));
    raw.insert("_page".into(), json!("3"));

    let first = validator.validate("addBook", &raw).unwrap();
    let second = validator.validate("addBook", &to_raw(&first)).unwrap();
    assert_eq!(first, second);
    assert_eq!(first["pages"], json!(412));
    assert_eq!(first["_page"], json!(3));
}

#[test]
fn test_cart_item_tolerates_extra_fields() {
    let mut raw = required_only("cartItem");
    raw.insert("giftWrap".into(), json!("yes"));

    let out = Validator::bookstore().validate("cartItem", &raw).unwrap();
    assert_eq!(out["nUnits"], json!(2));
    assert!(!out.contains_key("giftWrap"));
}

#[test]
fn test_cart_item_rejects_fractional_units() {
    let mut raw = required_only("cartItem");
    raw.insert("nUnits".into(), json!("2.5"));

    let errors = Validator::bookstore().validate("cartItem", &raw).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors.first().message,
        "bad value: \"2.5\": The Number of Units field must be an integer."
    );
}

#[test]
fn test_numeric_input_is_normalized_before_checks() {
    let mut raw = required_only("addBook");
    raw.insert("year".into(), json!(2001));
    raw.insert("pages".into(), json!(0));

    let errors = Validator::bookstore().validate("addBook", &raw).unwrap_err();
    assert_eq!(errors.kinds(), vec![ErrorKind::BadFieldValue]);
    assert_eq!(errors.first().field, "pages");
}

#[test]
fn test_errors_of_every_kind_come_back_together() {
    let raw = record(json!({
        "isbn": "x",
        "shelf": "B3",
        "authors": ["Ann"],
    }));

    let errors = Validator::bookstore().validate("findBooks", &raw).unwrap_err();
    assert_eq!(
        errors.kinds(),
        vec![ErrorKind::BadFieldValue, ErrorKind::BadField, ErrorKind::BadField]
    );
}

// ---------------------------------------------------------------------------
// Custom registries
// ---------------------------------------------------------------------------

#[test]
fn test_unknown_field_policy_is_per_schema() {
    let validator = strict_and_lenient();
    let raw = record(json!({"code": "AB", "extra": "1"}));

    let errors = validator.validate("strict", &raw).unwrap_err();
    assert_eq!(errors.kinds(), vec![ErrorKind::BadField]);
    assert_eq!(errors.first().field, "extra");

    let out = validator.validate("lenient", &raw).unwrap();
    assert_eq!(Value::Object(out), json!({"code": "AB"}));
}

#[test]
fn test_format_failure_suppresses_failing_record_check() {
    let schema = ActionSchema::builder("search")
        .field(FieldRule::new("isbn", "ISBN").with_check(FieldCheck::matches(
            Regex::new(r"^\d+$").unwrap(),
            "must be digits",
        )))
        .field(FieldRule::new("words", "Words"))
        .record_check(RecordCheck::any_non_blank(["words"], "words are required"))
        .build()
        .unwrap();
    let validator = Validator::new(SchemaRegistry::builder().action(schema).build().unwrap());

    let errors = validator
        .validate("search", &record(json!({"isbn": "abc", "words": ""})))
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().kind, ErrorKind::BadFieldValue);
    assert_eq!(errors.first().field, "isbn");
}

#[test]
fn test_independent_validators_coexist() {
    let custom = strict_and_lenient();
    let bookstore = Validator::bookstore();

    assert!(custom.registry().contains("strict"));
    assert!(!bookstore.registry().contains("strict"));
    let errors = bookstore
        .validate("strict", &record(json!({"code": "AB"})))
        .unwrap_err();
    assert_eq!(errors.kinds(), vec![ErrorKind::BadAction]);
}

#[test]
fn test_validator_is_shared_across_threads() {
    let validator = Arc::new(Validator::bookstore());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let validator = Arc::clone(&validator);
            thread::spawn(move || {
                let raw = record(json!({
                    "cartId": format!("cart-{i}"),
                    "sku": "s",
                    "nUnits": i.to_string(),
                }));
                validator.validate("cartItem", &raw).unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let out = handle.join().unwrap();
        assert_eq!(out["nUnits"], json!(i));
    }
}
