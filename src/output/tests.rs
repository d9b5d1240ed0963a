//! Tests for output module

use super::*;
use crate::error::ErrorStage;
use crate::source::{Cell, ColumnSchema};
use crate::types::{JsonValue, NullMode};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;
use test_case::test_case;

fn schema() -> ColumnSchema {
    ["id", "name", "tag"].into_iter().collect()
}

fn write_all(records: &[Record<'_>]) -> String {
    let mut writer = JsonArrayWriter::from_writer(Vec::new(), "memory").unwrap();
    for record in records {
        writer.write_record(record).unwrap();
    }
    let (_, bytes) = writer.finish().unwrap();
    String::from_utf8(bytes).unwrap()
}

// ============================================================================
// Cell Mapping Tests
// ============================================================================

#[test_case(Cell::Bool(true), json!(true) ; "boolean")]
#[test_case(Cell::Int(-42), json!(-42) ; "signed integer")]
#[test_case(Cell::UInt(u64::MAX), json!(u64::MAX) ; "unsigned integer")]
#[test_case(Cell::Float(2.5), json!(2.5) ; "float")]
#[test_case(Cell::Text("héllo".into()), json!("héllo") ; "text")]
#[test_case(Cell::Bytes(vec![0xde, 0xad, 0xbe, 0xef]), json!("3q2+7w==") ; "bytes as base64")]
fn test_cell_to_json_scalars(cell: Cell, expected: JsonValue) {
    assert_eq!(cell_to_json(cell, NullMode::Null).unwrap(), expected);
}

#[test_case(NullMode::Null, json!(null) ; "null")]
#[test_case(NullMode::EmptyString, json!("") ; "empty string")]
fn test_cell_to_json_absent(mode: NullMode, expected: JsonValue) {
    assert_eq!(cell_to_json(Cell::Null, mode).unwrap(), expected);
}

#[test_case(f64::NAN ; "nan")]
#[test_case(f64::INFINITY ; "infinity")]
#[test_case(f64::NEG_INFINITY ; "negative infinity")]
fn test_cell_to_json_non_finite(value: f64) {
    assert!(cell_to_json(Cell::Float(value), NullMode::Null).is_err());
}

#[test_case("19.99" ; "scaled")]
#[test_case("-0.50" ; "negative with trailing zero")]
#[test_case("170141183460469231731687303715884105727" ; "hugeint")]
fn test_cell_to_json_decimal_is_exact_number(digits: &str) {
    let value = cell_to_json(Cell::Decimal(digits.to_string()), NullMode::Null).unwrap();
    assert!(value.is_number());
    assert_eq!(serde_json::to_string(&value).unwrap(), digits);
}

#[test]
fn test_cell_to_json_malformed_decimal() {
    assert!(cell_to_json(Cell::Decimal("12,5".into()), NullMode::Null).is_err());
}

#[test]
fn test_cell_to_json_unsupported() {
    let err = cell_to_json(Cell::Unsupported("List([Int(1)])".into()), NullMode::Null)
        .unwrap_err();
    assert!(err.contains("List([Int(1)])"));
}

// ============================================================================
// Record Tests
// ============================================================================

#[test]
fn test_record_follows_schema_order() {
    let schema: ColumnSchema = ["zeta", "alpha", "mid"].into_iter().collect();
    let row = vec![Cell::Int(1), Cell::Int(2), Cell::Int(3)];
    let record = Record::from_row(&schema, row, NullMode::Null).unwrap();

    assert_eq!(record.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
    assert_eq!(
        serde_json::to_string(&record).unwrap(),
        r#"{"zeta":1,"alpha":2,"mid":3}"#
    );
}

#[test]
fn test_record_null_substitution() {
    let schema = schema();
    let row = vec![Cell::Int(3), Cell::Null, "y".into()];

    let plain = Record::from_row(&schema, row.clone(), NullMode::Null).unwrap();
    assert_eq!(plain.get("name"), Some(&JsonValue::Null));

    let replaced = Record::from_row(&schema, row, NullMode::EmptyString).unwrap();
    assert_eq!(replaced.get("name"), Some(&json!("")));
    assert_eq!(replaced.get("tag"), Some(&json!("y")));
    assert_eq!(replaced.get("missing"), None);
}

#[test]
fn test_record_serialization_error_names_column() {
    let schema = schema();
    let row = vec![Cell::Int(1), Cell::Float(f64::NAN), Cell::Null];
    let err = Record::from_row(&schema, row, NullMode::Null).unwrap_err();

    assert_eq!(err.stage(), ErrorStage::Serialization);
    assert!(err.to_string().contains("Column 'name'"));
}

#[test]
fn test_record_width_mismatch_is_source_error() {
    let schema = schema();
    let err = Record::from_row(&schema, vec![Cell::Int(1)], NullMode::Null).unwrap_err();
    assert_eq!(err.stage(), ErrorStage::Source);
}

// ============================================================================
// Writer Tests
// ============================================================================

#[test]
fn test_writer_empty_array() {
    let output = write_all(&[]);
    assert_eq!(output, "[\n\n]");
    assert_eq!(serde_json::from_str::<JsonValue>(&output).unwrap(), json!([]));
}

#[test]
fn test_writer_layout() {
    let schema: ColumnSchema = ["id", "name"].into_iter().collect();
    let records = vec![
        Record::from_row(&schema, vec![Cell::Int(1), "a".into()], NullMode::Null).unwrap(),
        Record::from_row(&schema, vec![Cell::Int(2), Cell::Null], NullMode::Null).unwrap(),
    ];

    let expected = "[\n{\n    \"id\": 1,\n    \"name\": \"a\"\n},\n{\n    \"id\": 2,\n    \"name\": null\n}\n]";
    assert_eq!(write_all(&records), expected);
}

#[test]
fn test_writer_scenario_output() {
    let schema = schema();
    let rows = vec![
        vec![Cell::Int(1), "a".into(), Cell::Null],
        vec![Cell::Int(2), "b".into(), "x".into()],
        vec![Cell::Int(3), Cell::Null, "y".into()],
    ];
    let records: Vec<_> = rows
        .into_iter()
        .map(|row| Record::from_row(&schema, row, NullMode::Null).unwrap())
        .collect();

    let parsed: JsonValue = serde_json::from_str(&write_all(&records)).unwrap();
    assert_eq!(
        parsed,
        json!([
            {"id": 1, "name": "a", "tag": null},
            {"id": 2, "name": "b", "tag": "x"},
            {"id": 3, "name": null, "tag": "y"}
        ])
    );
}

#[test]
fn test_writer_preserves_non_ascii() {
    let schema: ColumnSchema = ["ciudad"].into_iter().collect();
    let record =
        Record::from_row(&schema, vec!["Bogotá ñandú 東京".into()], NullMode::Null).unwrap();

    let output = write_all(&[record]);
    assert!(output.contains("Bogotá ñandú 東京"));
    assert!(!output.contains("\\u"));
}

#[test]
fn test_writer_counts_records() {
    let schema: ColumnSchema = ["n"].into_iter().collect();
    let mut writer = JsonArrayWriter::from_writer(Vec::new(), "memory").unwrap();
    for n in 0..5 {
        let record = Record::from_row(&schema, vec![Cell::Int(n)], NullMode::Null).unwrap();
        writer.write_record(&record).unwrap();
    }
    assert_eq!(writer.records_written(), 5);
    assert_eq!(writer.close().unwrap(), 5);
}

#[test]
fn test_writer_open_truncates_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.json");
    std::fs::write(&path, "old content that is much longer than an empty array").unwrap();

    let writer = JsonArrayWriter::open(&path).unwrap();
    assert_eq!(writer.path(), path.as_path());
    assert_eq!(writer.close().unwrap(), 0);

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[\n\n]");
}

#[test]
fn test_writer_open_invalid_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("out.json");

    let err = JsonArrayWriter::open(&path).err().unwrap();
    assert_eq!(err.stage(), ErrorStage::Destination);
    assert!(err.to_string().contains("out.json"));
}

/// Sink that accepts a fixed number of bytes, then fails
struct FullDisk {
    remaining: usize,
}

impl std::io::Write for FullDisk {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.remaining == 0 {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        }
        let n = buf.len().min(self.remaining);
        self.remaining -= n;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_writer_sink_failure_is_destination_error() {
    let schema: ColumnSchema = ["n"].into_iter().collect();
    let record = Record::from_row(&schema, vec![Cell::Int(1)], NullMode::Null).unwrap();

    let mut writer = JsonArrayWriter::from_writer(FullDisk { remaining: 4 }, "full").unwrap();
    let err = writer.write_record(&record).unwrap_err();
    assert_eq!(err.stage(), ErrorStage::Destination);
    assert!(err.to_string().contains("disk full"));
}
