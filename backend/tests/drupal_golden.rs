//! JSON feed output compared byte for byte against a stored file.

use std::fs;
use std::path::{Path, PathBuf};

use staffdir::parser::parse_bytes_auto;
use staffdir::{read_persons, render_json, CategoryStatusTable, FieldMappingEngine, MappingTable, OutputProfile};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn drupal_engine() -> FieldMappingEngine {
    let bytes = fs::read(fixture("drupal_mappings.csv")).unwrap();
    let parsed = parse_bytes_auto(&bytes).unwrap();
    let table = MappingTable::from_rows(&parsed.rows).unwrap();
    FieldMappingEngine::new(table, CategoryStatusTable::default(), OutputProfile::DRUPAL)
}

#[test]
fn test_drupal_output_matches_golden_file() {
    let persons = read_persons(&fixture("test_persons.json")).unwrap();
    let expected = fs::read_to_string(fixture("expected_drupal_output.json")).unwrap();

    let records = drupal_engine().persons_to_maps(&persons);
    let output = render_json(&records).unwrap();

    assert_eq!(output, expected);
}

#[test]
fn test_drupal_output_is_stable() {
    let persons = read_persons(&fixture("test_persons.json")).unwrap();
    let engine = drupal_engine();

    let mut reversed = persons.clone();
    reversed.reverse();

    let first = render_json(&engine.persons_to_maps(&persons)).unwrap();
    let second = render_json(&engine.persons_to_maps(&reversed)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_mapping_columns_in_sheet_order() {
    let engine = drupal_engine();
    assert_eq!(
        engine.columns(),
        &[
            "directory_id", "division", "department", "unit", "last_name", "first_name",
            "phone", "email", "title", "display_name", "location",
        ]
    );
}
