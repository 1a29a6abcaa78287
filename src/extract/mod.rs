//! Field extraction from fetched pages.
//!
//! Common fields are evaluated first in their fixed priority order, then
//! custom CSS selector rules in the order supplied. Missing elements produce
//! empty values, never errors; the only failures happen earlier, when a
//! [`RuleSet`] is built.
//!
//! # Example
//!
//! ```
//! use scrapehub_core::extract::{extract, CommonField, ExtractionRule, FieldValue, RuleSet};
//! use scrapehub_core::fetch::RawPage;
//!
//! let page = RawPage::from_html(
//!     "https://example.com",
//!     "<title>Shop</title><span class=price>4 &euro;</span>",
//! );
//! let rules = RuleSet::new(vec![
//!     CommonField::Title.into(),
//!     ExtractionRule::css("price", "span.price").unwrap(),
//! ])
//! .unwrap();
//!
//! let result = extract(&page, &rules);
//! assert_eq!(result.get("title"), Some(&FieldValue::Text("Shop".into())));
//! assert_eq!(result.get("price"), Some(&FieldValue::List(vec!["4 €".into()])));
//! ```

mod document;
mod rule;
mod text;

use serde::Serialize;
use serde::ser::SerializeMap;
use tracing::{debug, instrument};

use crate::fetch::RawPage;
use document::Document;

pub use rule::{
    CommonField, CssSelector, ExtractionRule, RESERVED_URL_LABEL, RuleError, RuleSet,
    parse_selector_lines,
};
pub use text::collapse_whitespace;
pub(crate) use text::visible_text;

/// Value reported under one rule label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Single string (title, body text, meta description).
    Text(String),
    /// Ordered matches (headings, links, custom selectors).
    List(Vec<String>),
    /// Ordered groups of entries (tables, lists, forms).
    Groups(Vec<Vec<String>>),
}

impl FieldValue {
    /// Whether the value carries no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Groups(groups) => groups.is_empty(),
        }
    }

    /// Flattens the value into one cell, list items separated by `separator`.
    ///
    /// Groups are separated by `separator` twice, so a newline separator
    /// leaves a blank line between tables.
    #[must_use]
    pub fn joined(&self, separator: &str) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::List(items) => items.join(separator),
            Self::Groups(groups) => groups
                .iter()
                .map(|group| group.join(separator))
                .collect::<Vec<_>>()
                .join(&separator.repeat(2)),
        }
    }
}

/// Labeled values extracted from one page.
///
/// Fields keep evaluation order, which export uses as column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    source_url: String,
    fields: Vec<(String, FieldValue)>,
}

impl ExtractionResult {
    /// URL of the page the values came from (after redirects).
    #[must_use]
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Value for `label`, if a rule with that label ran.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, value)| value)
    }

    /// Labels in evaluation order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(label, _)| label.as_str())
    }

    /// `(label, value)` pairs in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(label, value)| (label.as_str(), value))
    }

    /// Number of labeled values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no rules ran.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for ExtractionResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry(RESERVED_URL_LABEL, &self.source_url)?;
        for (label, value) in &self.fields {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

/// Applies `rules` to `page`.
///
/// Pure with respect to its inputs: the same page and rules always produce the
/// same result.
#[must_use]
#[instrument(skip(page, rules), fields(url = %page.final_url, rules = rules.len()))]
pub fn extract(page: &RawPage, rules: &RuleSet) -> ExtractionResult {
    let document = Document::parse(&page.body, &page.final_url);
    let mut fields = Vec::with_capacity(rules.len());

    for field in rules.common_in_priority() {
        fields.push((field.label().to_string(), document.common_field(field)));
    }
    for (label, selector) in rules.selectors() {
        let matches = document.select_texts(selector);
        debug!(label, selector = selector.source(), matches = matches.len(), "selector evaluated");
        fields.push((label.to_string(), FieldValue::List(matches)));
    }

    ExtractionResult {
        source_url: page.final_url.clone(),
        fields,
    }
}

/// Common fields with a non-empty value on `page`, in priority order.
#[must_use]
pub fn available_fields(page: &RawPage) -> Vec<CommonField> {
    let document = Document::parse(&page.body, &page.final_url);
    CommonField::ALL
        .into_iter()
        .filter(|field| !document.common_field(*field).is_empty())
        .collect()
}
