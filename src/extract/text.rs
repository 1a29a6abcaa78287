//! Text normalization for extracted values.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Node};

#[allow(clippy::expect_used)]
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

/// Collapses runs of whitespace to one space and trims both ends.
///
/// Entity decoding already happened in the HTML parser, so the input is
/// plain text.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

/// Elements whose text never counts as visible text.
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Elements that start a new line when rendered. Their boundaries become a
/// space; inline elements join their neighbours directly.
const BLOCK_ELEMENTS: [&str; 32] = [
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li",
    "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr",
];

/// Visible text under `root`, whitespace-collapsed.
///
/// Script-like elements are skipped. Text split across inline tags is
/// concatenated as-is, so `un<b>believ</b>able` stays one word.
pub(crate) fn visible_text(root: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_visible_text(root, &mut out);
    collapse_whitespace(&out)
}

fn push_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Node::Text(text) = child.value() {
            out.push_str(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if HIDDEN_ELEMENTS.contains(&name) {
                continue;
            }
            let block = BLOCK_ELEMENTS.contains(&name);
            if block {
                out.push(' ');
            }
            push_visible_text(child_element, out);
            if block {
                out.push(' ');
            }
        }
    }
}
