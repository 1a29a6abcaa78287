//! Extraction rules and validated rule sets.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;
use thiserror::Error;

/// Label reserved for the source-URL column of exported records.
pub const RESERVED_URL_LABEL: &str = "url";

#[allow(clippy::expect_used)]
static SELECTOR_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z0-9_\-]+)\s*:\s*(.+?)\s*$").expect("selector line regex is valid")
});

/// Errors raised while building a rule set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// Two rules report under the same label.
    #[error("duplicate rule label '{label}'")]
    DuplicateLabel {
        /// The repeated label.
        label: String,
    },

    /// Label is empty or reserved.
    #[error("invalid rule label '{label}': {reason}")]
    InvalidLabel {
        /// The rejected label.
        label: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// CSS selector failed to parse.
    #[error("invalid CSS selector '{selector}' for '{label}': {reason}")]
    InvalidSelector {
        /// Rule label.
        label: String,
        /// Selector source text.
        selector: String,
        /// Parser message.
        reason: String,
    },

    /// Line in `label: selector` input did not match the format.
    #[error("line {line_number}: expected 'label: selector' (got: {content})")]
    MalformedLine {
        /// 1-based line number.
        line_number: usize,
        /// The offending line.
        content: String,
    },

    /// Name does not match any built-in common field.
    #[error("unknown common field '{name}'")]
    UnknownField {
        /// The unrecognized name.
        name: String,
    },
}

/// Built-in extraction targets that need no selector.
///
/// The declaration order is the evaluation priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommonField {
    /// Text of the `<title>` element.
    Title,
    /// Text of every `h1`..`h6`, in document order.
    Headings,
    /// Absolute `href` of every link.
    Links,
    /// Visible text of `<body>`, scripts and styles excluded.
    BodyText,
    /// Text of every `<p>`.
    Paragraphs,
    /// Absolute `src` of every image.
    Images,
    /// Content of `<meta name="description">`.
    MetaDescription,
    /// Anchor text of every link, aligned with `links`.
    LinkText,
    /// `alt` text of every image, aligned with `images`.
    ImageAlt,
    /// One group per non-empty `<table>`: a row of ` | `-joined cells per `<tr>`.
    Tables,
    /// One group per non-empty `<ul>`/`<ol>`: the text of each `<li>`.
    Lists,
    /// One group per `<form>`: its method and action, then one descriptor per
    /// `input`, `select` or `textarea`.
    Forms,
}

impl CommonField {
    /// Every common field in priority order.
    pub const ALL: [Self; 12] = [
        Self::Title,
        Self::Headings,
        Self::Links,
        Self::BodyText,
        Self::Paragraphs,
        Self::Images,
        Self::MetaDescription,
        Self::LinkText,
        Self::ImageAlt,
        Self::Tables,
        Self::Lists,
        Self::Forms,
    ];

    /// Label used in results.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Headings => "headings",
            Self::Links => "links",
            Self::BodyText => "body_text",
            Self::Paragraphs => "paragraphs",
            Self::Images => "images",
            Self::MetaDescription => "meta_description",
            Self::LinkText => "link_text",
            Self::ImageAlt => "image_alt",
            Self::Tables => "tables",
            Self::Lists => "lists",
            Self::Forms => "forms",
        }
    }
}

impl fmt::Display for CommonField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CommonField {
    type Err = RuleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|field| field.label() == normalized)
            .ok_or_else(|| RuleError::UnknownField {
                name: value.to_string(),
            })
    }
}

/// A parsed CSS selector that remembers its source text.
#[derive(Clone)]
pub struct CssSelector {
    source: String,
    compiled: Selector,
}

impl CssSelector {
    /// Selector text as supplied.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn compiled(&self) -> &Selector {
        &self.compiled
    }
}

impl fmt::Debug for CssSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CssSelector").field(&self.source).finish()
    }
}

impl PartialEq for CssSelector {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for CssSelector {}

/// One extraction rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionRule {
    /// Built-in heuristic, reported under its own label.
    CommonField(CommonField),
    /// User selector, reported under `label`.
    CssSelector {
        /// Result label.
        label: String,
        /// Compiled selector.
        selector: CssSelector,
    },
}

impl ExtractionRule {
    /// Creates a custom selector rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidSelector`] when `selector` does not parse.
    pub fn css(label: impl Into<String>, selector: &str) -> Result<Self, RuleError> {
        let label = label.into();
        let compiled = Selector::parse(selector).map_err(|e| RuleError::InvalidSelector {
            label: label.clone(),
            selector: selector.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::CssSelector {
            label,
            selector: CssSelector {
                source: selector.to_string(),
                compiled,
            },
        })
    }

    /// Label this rule reports under.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::CommonField(field) => field.label(),
            Self::CssSelector { label, .. } => label,
        }
    }
}

impl From<CommonField> for ExtractionRule {
    fn from(field: CommonField) -> Self {
        Self::CommonField(field)
    }
}

/// An ordered, label-unique sequence of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<ExtractionRule>,
}

impl RuleSet {
    /// Validates and wraps `rules`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::DuplicateLabel`] for repeated labels and
    /// [`RuleError::InvalidLabel`] for empty or reserved labels.
    pub fn new(rules: Vec<ExtractionRule>) -> Result<Self, RuleError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            let label = rule.label();
            if label.trim().is_empty() {
                return Err(RuleError::InvalidLabel {
                    label: label.to_string(),
                    reason: "label is empty",
                });
            }
            if label == RESERVED_URL_LABEL {
                return Err(RuleError::InvalidLabel {
                    label: label.to_string(),
                    reason: "label is reserved for the source URL",
                });
            }
            if !seen.insert(label.to_string()) {
                return Err(RuleError::DuplicateLabel {
                    label: label.to_string(),
                });
            }
        }
        Ok(Self { rules })
    }

    /// Rule set with every common field and no custom selectors.
    #[must_use]
    pub fn common_fields() -> Self {
        Self {
            rules: CommonField::ALL.into_iter().map(Into::into).collect(),
        }
    }

    /// Rules in the order supplied.
    #[must_use]
    pub fn rules(&self) -> &[ExtractionRule] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Common fields sorted into evaluation priority.
    pub(crate) fn common_in_priority(&self) -> Vec<CommonField> {
        let mut fields: Vec<CommonField> = self
            .rules
            .iter()
            .filter_map(|rule| match rule {
                ExtractionRule::CommonField(field) => Some(*field),
                ExtractionRule::CssSelector { .. } => None,
            })
            .collect();
        fields.sort_unstable();
        fields
    }

    /// Custom selector rules in supplied order.
    pub(crate) fn selectors(&self) -> impl Iterator<Item = (&str, &CssSelector)> {
        self.rules.iter().filter_map(|rule| match rule {
            ExtractionRule::CssSelector { label, selector } => Some((label.as_str(), selector)),
            ExtractionRule::CommonField(_) => None,
        })
    }
}

/// Parses `label: selector` lines into selector rules.
///
/// Blank lines and lines starting with `#` are skipped. Only the first `:`
/// separates label from selector, so pseudo-classes survive in the selector.
///
/// # Errors
///
/// Returns [`RuleError::MalformedLine`] for lines without a label, or
/// [`RuleError::InvalidSelector`] for selectors that do not parse.
pub fn parse_selector_lines(input: &str) -> Result<Vec<ExtractionRule>, RuleError> {
    let mut rules = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let captures = SELECTOR_LINE
            .captures(trimmed)
            .ok_or_else(|| RuleError::MalformedLine {
                line_number: idx + 1,
                content: trimmed.to_string(),
            })?;
        rules.push(ExtractionRule::css(&captures[1], &captures[2])?);
    }
    Ok(rules)
}
