use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::{Value, json};

const BIN: &str = env!("CARGO_BIN_EXE_action-validate");

fn run(args: &[&str]) -> Output {
    Command::new(BIN)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run action-validate")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_prints_canonical_record() {
    let output = run(&[
        "check",
        "addBook",
        "isbn=1-2-3",
        "title=T",
        "authors=[A B; C-D]",
        "publisher=P",
        "year=1999",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout_json(&output),
        json!({
            "isbn": "1-2-3",
            "title": "T",
            "authors": ["A B", "C-D"],
            "publisher": "P",
            "year": 1999
        })
    );
}

#[test]
fn check_reports_every_error_and_fails() {
    let output = run(&["check", "addBook", "isbn=abc", "year=99"]);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("isbn:BAD_FIELD_VALUE:"), "stderr: {err}");
    assert!(err.contains("year:BAD_FIELD_VALUE:"), "stderr: {err}");
    assert!(
        err.contains(":MISSING_FIELD: missing fields \"Book Title\", \"Author Names\", \"Publisher\"."),
        "stderr: {err}"
    );
}

#[test]
fn check_rejects_unknown_action() {
    let output = run(&["check", "burnBooks", "isbn=1"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains(":BAD_ACTION: bad action burnBooks"));
}

#[test]
fn check_rejects_leftover_arguments() {
    let output = run(&["check", "getCart", "cartId=c1", "stray"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown arguments stray"));
}

#[test]
fn check_merges_json_include() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("book.json"),
        r#"{"title": "T", "authors": ["Ann"], "publisher": "P", "year": "2001"}"#,
    )
    .unwrap();

    let output = run(&[
        "check",
        "--data-dir",
        path_str(dir.path()),
        "addBook",
        "isbn=42",
        "_json=book.json",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout_json(&output)["year"], json!(2001));
}

// ---------------------------------------------------------------------------
// check-file
// ---------------------------------------------------------------------------

#[test]
fn check_file_reports_failures_by_index() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("carts.json");
    fs::write(
        &data,
        json!([
            {"cartId": "c1", "sku": "s1", "nUnits": "2"},
            {"cartId": "c 2", "sku": "s2", "nUnits": "1"},
            {"cartId": "c3", "sku": "s3", "nUnits": "5", "note": "gift"}
        ])
        .to_string(),
    )
    .unwrap();

    let output = run(&["check-file", "cartItem", path_str(&data)]);

    assert!(!output.status.success());
    let accepted = stdout_json(&output);
    assert_eq!(accepted.as_array().unwrap().len(), 2);
    assert_eq!(accepted[1], json!({"cartId": "c3", "sku": "s3", "nUnits": 5}));
    assert!(stderr(&output).contains("record 1: cartId:BAD_FIELD_VALUE:"));
}

// ---------------------------------------------------------------------------
// schemas
// ---------------------------------------------------------------------------

#[test]
fn actions_lists_bookstore_schemas() {
    let output = run(&["actions"]);

    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    for action in ["addBook", "cartItem", "findBooks", "getCart", "newCart"] {
        assert!(text.contains(action), "missing {action} in {text}");
    }
}

#[test]
fn exported_schemas_can_replace_builtins() {
    let dir = tempfile::tempdir().unwrap();
    let schemas = dir.path().join("out").join("bookstore.yml");

    let output = run(&["export-schemas", "--output", path_str(&schemas)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(schemas.exists());

    let output = run(&[
        "--schemas",
        path_str(&schemas),
        "check",
        "findBooks",
        "isbn=",
        "authorsTitleSearch=",
    ]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains(":FORM_ERROR: At least one search field must be specified."));
}

#[test]
fn bad_schema_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let schemas = dir.path().join("broken.yaml");
    fs::write(&schemas, "version: \"1.0\"\nactions:\n  - name: a\n  - name: a\n").unwrap();

    let output = run(&["--schemas", path_str(&schemas), "actions"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("duplicate action: a"));
}
