//! CSV and JSON export of extraction results and job records.
//!
//! Both formats share one column order: the union of labels across all
//! records, in first-seen order. A record missing a column gets an empty
//! value, so CSV rows are never ragged and JSON objects all carry the same
//! keys in the same order.

mod error;
mod filename;
mod record;

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use serde::ser::SerializeMap;
use tracing::{debug, info, instrument};

use crate::extract::FieldValue;

pub use error::WriteError;
pub use filename::{MAX_FILENAME_CHARS, export_filename, numbered_filename};
pub use record::{ExportRecord, Exportable};

/// Separator between list items inside one CSV cell.
pub const CSV_LIST_SEPARATOR: &str = "\n";

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Comma-separated values with a header row.
    #[default]
    Csv,
    /// Pretty-printed JSON array of objects.
    Json,
}

impl ExportFormat {
    /// File extension including the leading dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => ".csv",
            Self::Json => ".json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => f.write_str("csv"),
            Self::Json => f.write_str("json"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown export format '{other}' (expected csv or json)")),
        }
    }
}

/// Options for [`write_records`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Replace an existing destination instead of failing.
    pub overwrite: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { overwrite: true }
    }
}

/// Union of labels across `records`, in first-seen order.
#[must_use]
pub fn header(records: &[ExportRecord]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for label in record.labels() {
            if !columns.iter().any(|c| c == label) {
                columns.push(label.to_string());
            }
        }
    }
    columns
}

/// Writes `records` as CSV to `writer`. No records means no output.
///
/// # Errors
///
/// Returns [`WriteError::Csv`] if encoding or the underlying writer fails.
pub fn render_csv<W: Write>(records: &[ExportRecord], writer: W) -> Result<(), WriteError> {
    let columns = header(records);
    if columns.is_empty() {
        return Ok(());
    }

    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    csv_writer.write_record(&columns).map_err(WriteError::csv)?;
    for record in records {
        let row = columns.iter().map(|column| {
            record
                .get(column)
                .map(|value| value.joined(CSV_LIST_SEPARATOR))
                .unwrap_or_default()
        });
        csv_writer.write_record(row).map_err(WriteError::csv)?;
    }
    csv_writer
        .flush()
        .map_err(|e| WriteError::csv(csv::Error::from(e)))?;
    Ok(())
}

/// Writes `records` as a JSON array of objects to `writer`.
///
/// # Errors
///
/// Returns [`WriteError::Json`] if encoding or the underlying writer fails.
pub fn render_json<W: Write>(records: &[ExportRecord], writer: W) -> Result<(), WriteError> {
    let columns = header(records);
    let rows: Vec<JsonRow<'_>> = records
        .iter()
        .map(|record| JsonRow {
            columns: &columns,
            record,
        })
        .collect();
    serde_json::to_writer_pretty(writer, &rows).map_err(WriteError::json)
}

struct JsonRow<'a> {
    columns: &'a [String],
    record: &'a ExportRecord,
}

impl Serialize for JsonRow<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let empty = FieldValue::Text(String::new());
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for column in self.columns {
            map.serialize_entry(column, self.record.get(column).unwrap_or(&empty))?;
        }
        map.end()
    }
}

/// Converts `items` and writes them to `destination` in `format`.
///
/// # Errors
///
/// Returns [`WriteError::DestinationExists`] when `options.overwrite` is off
/// and the file exists, [`WriteError::Io`] on filesystem failures, or an
/// encoding error from the chosen format.
#[instrument(skip(items, destination), fields(path = %destination.as_ref().display(), count = items.len()))]
pub fn write_records<T: Exportable>(
    items: &[T],
    format: ExportFormat,
    destination: impl AsRef<Path>,
    options: ExportOptions,
) -> Result<(), WriteError> {
    let path = destination.as_ref();
    let records: Vec<ExportRecord> = items.iter().map(Exportable::to_record).collect();

    let file = open_destination(path, options)?;
    let mut writer = BufWriter::new(file);
    match format {
        ExportFormat::Csv => render_csv(&records, &mut writer)?,
        ExportFormat::Json => render_json(&records, &mut writer)?,
    }
    writer.flush().map_err(|e| WriteError::io(path, e))?;

    info!(format = %format, records = records.len(), "export written");
    Ok(())
}

fn open_destination(path: &Path, options: ExportOptions) -> Result<File, WriteError> {
    if options.overwrite {
        return File::create(path).map_err(|e| WriteError::io(path, e));
    }
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| {
            if e.kind() == io::ErrorKind::AlreadyExists {
                debug!("destination exists and overwrite is disabled");
                WriteError::destination_exists(path)
            } else {
                WriteError::io(path, e)
            }
        })
}
