//! Wire shapes of LinkedIn job responses and the records built from them.

use chrono::{DateTime, Utc};
use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::extract::{collapse_whitespace, visible_text};

/// Maximum characters kept in [`JobRecord::description`].
pub const DESCRIPTION_SNIPPET_CHARS: usize = 200;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobSearchResponse {
    #[serde(default)]
    pub elements: Vec<JobElement>,
    #[serde(default)]
    pub paging: Option<Paging>,
    #[serde(default)]
    pub metadata: Option<SearchMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Paging {
    pub total: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchMetadata {
    pub search_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct JobElement {
    pub id: serde_json::Value,
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<JobLocation>,
    pub listed_at: Option<i64>,
    pub apply_url: Option<String>,
    pub description: Option<String>,
    pub employment_status: Option<String>,
    pub experience_level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct JobLocation {
    pub name: Option<String>,
}

impl JobElement {
    /// Id as text; numeric ids are stringified, missing ids yield `None`.
    pub(crate) fn id_string(&self) -> Option<String> {
        match &self.id {
            serde_json::Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
            serde_json::Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    pub(crate) fn into_record(self) -> Option<JobRecord> {
        let id = self.id_string()?;
        Some(JobRecord {
            id,
            title: text_or_empty(self.title.as_deref()),
            company: text_or_empty(self.company_name.as_deref()),
            location: text_or_empty(self.location.and_then(|l| l.name).as_deref()),
            posted_at: self.listed_at.and_then(DateTime::from_timestamp_millis),
            description: self
                .description
                .as_deref()
                .map(description_snippet)
                .unwrap_or_default(),
            apply_url: self.apply_url.filter(|u| !u.trim().is_empty()),
        })
    }

    pub(crate) fn into_details(self) -> Option<JobDetails> {
        let full_description = self
            .description
            .as_deref()
            .map(html_to_text)
            .unwrap_or_default();
        let employment_status = self.employment_status.clone();
        let experience_level = self.experience_level.clone();
        let record = self.into_record()?;
        Some(JobDetails {
            record,
            full_description,
            employment_status,
            experience_level,
        })
    }
}

/// One job posting from a search page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Posting id; unique within a search session.
    pub id: String,
    /// Job title.
    pub title: String,
    /// Hiring company.
    pub company: String,
    /// Location name.
    pub location: String,
    /// When the posting was listed.
    pub posted_at: Option<DateTime<Utc>>,
    /// Plain-text description, at most 200 characters.
    pub description: String,
    /// Application link.
    pub apply_url: Option<String>,
}

/// A single posting fetched by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobDetails {
    /// Summary fields.
    pub record: JobRecord,
    /// Whole description as plain text.
    pub full_description: String,
    /// e.g. `FULL_TIME`.
    pub employment_status: Option<String>,
    /// e.g. `MID_SENIOR`.
    pub experience_level: Option<String>,
}

fn text_or_empty(value: Option<&str>) -> String {
    value.map(collapse_whitespace).unwrap_or_default()
}

fn html_to_text(html: &str) -> String {
    visible_text(Html::parse_fragment(html).root_element())
}

/// Strips markup and bounds the text to [`DESCRIPTION_SNIPPET_CHARS`].
#[must_use]
pub fn description_snippet(html: &str) -> String {
    let text = html_to_text(html);
    if text.chars().count() <= DESCRIPTION_SNIPPET_CHARS {
        return text;
    }
    let mut snippet: String = text.chars().take(DESCRIPTION_SNIPPET_CHARS - 3).collect();
    snippet.truncate(snippet.trim_end().len());
    snippet.push_str("...");
    snippet
}
