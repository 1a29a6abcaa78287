//! Integration tests for export writing.
//!
//! Extraction results and job records are written to temp directories and
//! read back with the `csv` and `serde_json` readers.

use scrapehub_core::export::{
    ExportFormat, ExportOptions, ExportRecord, WriteError, export_filename, write_records,
};
use scrapehub_core::fetch::RawPage;
use scrapehub_core::linkedin::JobRecord;
use scrapehub_core::{CommonField, ExtractionRule, RuleSet, extract};
use serde_json::Value;
use tempfile::TempDir;

const PAGE: &str = r#"<html><head><title>Cat</title></head><body>
    <h1>Cats</h1><h2>Behaviour</h2>
    <ul><li class="fact">Purrs</li><li class="fact">Sleeps a lot</li></ul>
</body></html>"#;

fn extraction_rules() -> RuleSet {
    RuleSet::new(vec![
        CommonField::Title.into(),
        CommonField::Headings.into(),
        ExtractionRule::css("facts", "li.fact").expect("valid selector"),
    ])
    .expect("valid rules")
}

#[test]
fn test_csv_and_json_exports_agree() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let page = RawPage::from_html("https://en.wikipedia.org/wiki/Cat", PAGE);
    let result = extract(&page, &extraction_rules());

    let csv_path = temp_dir.path().join(export_filename(page.final_url.as_str(), ExportFormat::Csv));
    let json_path = temp_dir
        .path()
        .join(export_filename(page.final_url.as_str(), ExportFormat::Json));
    write_records(&[result.clone()], ExportFormat::Csv, &csv_path, ExportOptions::default())
        .expect("csv export");
    write_records(&[result], ExportFormat::Json, &json_path, ExportOptions::default())
        .expect("json export");
    assert!(csv_path.ends_with("Cat.csv"));
    assert!(json_path.ends_with("Cat.json"));

    let mut reader = csv::Reader::from_path(&csv_path).expect("csv readable");
    let headers: Vec<String> = reader
        .headers()
        .expect("header row")
        .iter()
        .map(String::from)
        .collect();
    assert_eq!(headers, vec!["url", "title", "headings", "facts"]);
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.expect("row")).collect();
    assert_eq!(rows.len(), 1);

    let json: Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).expect("json readable"))
            .expect("valid json");
    let object = json[0].as_object().expect("object row");
    let keys: Vec<&str> = object.keys().map(String::as_str).collect();
    assert_eq!(keys.len(), headers.len());

    for (index, column) in headers.iter().enumerate() {
        let cell = &rows[0][index];
        let from_json = match &object[column] {
            Value::String(text) => text.clone(),
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_str().expect("string item"))
                .collect::<Vec<_>>()
                .join("\n"),
            other => panic!("unexpected JSON value {other}"),
        };
        assert_eq!(cell, from_json, "column {column} differs");
    }
    assert_eq!(object["facts"], serde_json::json!(["Purrs", "Sleeps a lot"]));
}

#[test]
fn test_missing_fields_written_as_empty() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let path = temp_dir.path().join("mixed.csv");
    let records = vec![
        ExportRecord::new().with_text("a", "1"),
        ExportRecord::new().with_text("b", "2"),
    ];
    write_records(&records, ExportFormat::Csv, &path, ExportOptions::default()).expect("export");

    let content = std::fs::read_to_string(&path).expect("readable");
    assert_eq!(content, "a,b\n1,\n,2\n");
}

#[test]
fn test_empty_input_writes_empty_outputs() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let csv_path = temp_dir.path().join("none.csv");
    let json_path = temp_dir.path().join("none.json");
    let nothing: Vec<ExportRecord> = Vec::new();

    write_records(&nothing, ExportFormat::Csv, &csv_path, ExportOptions::default())
        .expect("csv export");
    write_records(&nothing, ExportFormat::Json, &json_path, ExportOptions::default())
        .expect("json export");

    assert_eq!(std::fs::read_to_string(&csv_path).expect("readable"), "");
    let json: Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).expect("readable"))
            .expect("valid json");
    assert_eq!(json, serde_json::json!([]));
}

#[test]
fn test_no_overwrite_keeps_existing_file() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let path = temp_dir.path().join("jobs.csv");
    std::fs::write(&path, "keep me").expect("seed file");

    let err = write_records(
        &[ExportRecord::new().with_text("x", "1")],
        ExportFormat::Csv,
        &path,
        ExportOptions { overwrite: false },
    )
    .expect_err("existing destination");
    assert!(matches!(err, WriteError::DestinationExists { .. }));
    assert_eq!(std::fs::read_to_string(&path).expect("readable"), "keep me");

    write_records(
        &[ExportRecord::new().with_text("x", "1")],
        ExportFormat::Csv,
        &path,
        ExportOptions { overwrite: true },
    )
    .expect("overwrite allowed");
    assert_eq!(std::fs::read_to_string(&path).expect("readable"), "x\n1\n");
}

#[test]
fn test_missing_directory_is_io_error() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let path = temp_dir.path().join("absent").join("out.json");
    let err = write_records(
        &[ExportRecord::new().with_text("x", "1")],
        ExportFormat::Json,
        &path,
        ExportOptions::default(),
    )
    .expect_err("parent directory missing");
    assert!(matches!(err, WriteError::Io { .. }));
}

#[test]
fn test_job_records_export_fixed_columns() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let path = temp_dir.path().join("jobs.csv");
    let job = JobRecord {
        id: "42".to_string(),
        title: "Rust Engineer".to_string(),
        company: "Acme, Inc.".to_string(),
        location: "Berlin".to_string(),
        posted_at: chrono::DateTime::from_timestamp(1_700_000_000, 0),
        description: "Build things".to_string(),
        apply_url: None,
    };
    write_records(&[job], ExportFormat::Csv, &path, ExportOptions::default()).expect("export");

    let content = std::fs::read_to_string(&path).expect("readable");
    assert_eq!(
        content,
        "id,title,company,location,posted_date,description,apply_url\n\
         42,Rust Engineer,\"Acme, Inc.\",Berlin,2023-11-14,Build things,\n"
    );
}
