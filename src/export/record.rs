//! Flat labeled rows shared by both export formats.

use crate::extract::{ExtractionResult, FieldValue, RESERVED_URL_LABEL};
use crate::linkedin::JobRecord;

/// One exported row: labeled values in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportRecord {
    fields: Vec<(String, FieldValue)>,
}

impl ExportRecord {
    /// Empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column, replacing any earlier value with the same label.
    pub fn push(&mut self, label: impl Into<String>, value: FieldValue) {
        let label = label.into();
        if let Some(slot) = self.fields.iter_mut().find(|(name, _)| *name == label) {
            slot.1 = value;
        } else {
            self.fields.push((label, value));
        }
    }

    /// Builder form of [`push`](Self::push) for plain text.
    #[must_use]
    pub fn with_text(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(label, FieldValue::Text(value.into()));
        self
    }

    /// Value for `label`.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, value)| value)
    }

    /// Labels in column order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(label, _)| label.as_str())
    }
}

/// Anything that can be written as an export row.
pub trait Exportable {
    /// Converts `self` into a row.
    fn to_record(&self) -> ExportRecord;
}

impl Exportable for ExportRecord {
    fn to_record(&self) -> ExportRecord {
        self.clone()
    }
}

impl Exportable for ExtractionResult {
    fn to_record(&self) -> ExportRecord {
        let mut record = ExportRecord::new().with_text(RESERVED_URL_LABEL, self.source_url());
        for (label, value) in self.iter() {
            record.push(label, value.clone());
        }
        record
    }
}

impl Exportable for JobRecord {
    fn to_record(&self) -> ExportRecord {
        ExportRecord::new()
            .with_text("id", &self.id)
            .with_text("title", &self.title)
            .with_text("company", &self.company)
            .with_text("location", &self.location)
            .with_text(
                "posted_date",
                self.posted_at
                    .map(|at| at.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            )
            .with_text("description", &self.description)
            .with_text("apply_url", self.apply_url.as_deref().unwrap_or_default())
    }
}
