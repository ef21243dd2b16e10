//! Reading JSON documents and raw records from disk.
//!
//! Files ending in `.gz` are gunzipped on the fly.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use action_schema_core::Record;
use flate2::read::GzDecoder;
use serde_json::Value;
use tracing::debug;

use crate::error::{ConfigError, Result};

fn open(path: &Path) -> Result<Box<dyn Read>> {
    let file = BufReader::new(File::open(path)?);
    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

/// Reads a JSON document, decompressing `*.gz` files.
///
/// # Errors
///
/// Returns [`IoError`](ConfigError::IoError) if the file cannot be read or
/// decompressed, or [`JsonError`](ConfigError::JsonError) if parsing fails.
pub fn read_json(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let value = serde_json::from_reader(open(path)?)?;
    debug!(path = %path.display(), "read JSON document");
    Ok(value)
}

/// Reads a JSON object to merge into a raw record.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidRecords`] if the document is not an object.
pub fn read_record(path: impl AsRef<Path>) -> Result<Record> {
    let path = path.as_ref();
    match read_json(path)? {
        Value::Object(record) => Ok(record),
        _ => Err(ConfigError::InvalidRecords(format!(
            "{} does not hold a JSON object",
            path.display()
        ))),
    }
}

/// Reads a JSON array of raw records.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidRecords`] if the document is not an array
/// or any entry is not an object.
///
/// # Examples
///
/// ```no_run
/// use action_schema_config::load_records;
///
/// let books = load_records("books.json.gz").unwrap();
/// println!("{} books to check", books.len());
/// ```
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let Value::Array(entries) = read_json(path)? else {
        return Err(ConfigError::InvalidRecords(format!(
            "{} does not hold a JSON array",
            path.display()
        )));
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| match entry {
            Value::Object(record) => Ok(record),
            _ => Err(ConfigError::InvalidRecords(format!(
                "entry {i} of {} is not an object",
                path.display()
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_reads_gzipped_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.json.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder
            .write_all(json!([{"isbn": "1"}, {"isbn": "2"}]).to_string().as_bytes())
            .unwrap();
        encoder.finish().unwrap();

        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["isbn"], json!("2"));
    }

    #[test]
    fn test_rejects_non_object_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.json");
        std::fs::write(&path, r#"[{"isbn": "1"}, "oops"]"#).unwrap();

        let err = load_records(&path).unwrap_err();
        assert!(err.to_string().contains("entry 1"));
    }

    #[test]
    fn test_read_record_requires_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        assert!(matches!(read_record(&path), Err(ConfigError::InvalidRecords(_))));
    }
}
