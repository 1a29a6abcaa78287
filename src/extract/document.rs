//! Parsed-document queries behind the common fields and custom selectors.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::rule::{CommonField, CssSelector};
use super::text::{collapse_whitespace, visible_text};
use super::FieldValue;

#[allow(clippy::expect_used)]
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector is valid"));

#[allow(clippy::expect_used)]
static HEADINGS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6").expect("heading selector is valid")
});

#[allow(clippy::expect_used)]
static LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("link selector is valid"));

#[allow(clippy::expect_used)]
static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("body selector is valid"));

#[allow(clippy::expect_used)]
static PARAGRAPHS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("paragraph selector is valid"));

#[allow(clippy::expect_used)]
static IMAGES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[src]").expect("image selector is valid"));

#[allow(clippy::expect_used)]
static META_DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[name="description"]"#).expect("meta selector is valid")
});

#[allow(clippy::expect_used)]
static TABLES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("table selector is valid"));

#[allow(clippy::expect_used)]
static TABLE_ROWS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("row selector is valid"));

#[allow(clippy::expect_used)]
static TABLE_CELLS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td, th").expect("cell selector is valid"));

#[allow(clippy::expect_used)]
static LISTS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul, ol").expect("list selector is valid"));

#[allow(clippy::expect_used)]
static LIST_ITEMS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li").expect("list item selector is valid"));

#[allow(clippy::expect_used)]
static FORMS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("form").expect("form selector is valid"));

#[allow(clippy::expect_used)]
static FORM_CONTROLS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("input, select, textarea").expect("form control selector is valid")
});

const CELL_SEPARATOR: &str = " | ";

/// A parsed HTML page plus the URL its relative references resolve against.
pub(crate) struct Document {
    html: Html,
    base_url: Option<Url>,
}

impl Document {
    pub(crate) fn parse(body: &str, page_url: &str) -> Self {
        Self {
            html: Html::parse_document(body),
            base_url: Url::parse(page_url).ok(),
        }
    }

    pub(crate) fn common_field(&self, field: CommonField) -> FieldValue {
        match field {
            CommonField::Title => FieldValue::Text(
                self.html
                    .select(&TITLE)
                    .next()
                    .map(|el| element_text(&el))
                    .unwrap_or_default(),
            ),
            CommonField::Headings => FieldValue::List(self.non_empty_texts(&HEADINGS)),
            CommonField::Links => FieldValue::List(
                self.with_resolved_attr(&LINKS, "href")
                    .map(|(_, url)| url)
                    .collect(),
            ),
            CommonField::BodyText => FieldValue::Text(self.body_text()),
            CommonField::Paragraphs => FieldValue::List(self.non_empty_texts(&PARAGRAPHS)),
            CommonField::Images => FieldValue::List(
                self.with_resolved_attr(&IMAGES, "src")
                    .map(|(_, url)| url)
                    .collect(),
            ),
            CommonField::MetaDescription => FieldValue::Text(
                self.html
                    .select(&META_DESCRIPTION)
                    .find_map(|el| el.value().attr("content"))
                    .map(collapse_whitespace)
                    .unwrap_or_default(),
            ),
            CommonField::LinkText => FieldValue::List(
                self.with_resolved_attr(&LINKS, "href")
                    .map(|(el, _)| element_text(&el))
                    .collect(),
            ),
            CommonField::ImageAlt => FieldValue::List(
                self.with_resolved_attr(&IMAGES, "src")
                    .map(|(el, _)| {
                        el.value()
                            .attr("alt")
                            .map(collapse_whitespace)
                            .unwrap_or_default()
                    })
                    .collect(),
            ),
            CommonField::Tables => FieldValue::Groups(self.tables()),
            CommonField::Lists => FieldValue::Groups(self.lists()),
            CommonField::Forms => FieldValue::Groups(self.forms()),
        }
    }

    /// Text of every match, in document order. Empty matches are kept so
    /// positions line up with the matched elements.
    pub(crate) fn select_texts(&self, selector: &CssSelector) -> Vec<String> {
        self.html
            .select(selector.compiled())
            .map(|el| element_text(&el))
            .collect()
    }

    fn non_empty_texts(&self, selector: &Selector) -> Vec<String> {
        self.html
            .select(selector)
            .map(|el| element_text(&el))
            .filter(|text| !text.is_empty())
            .collect()
    }

    /// Matches of `selector` with a usable `attr`, paired with that value
    /// resolved against the page URL. Empty and `javascript:` values are
    /// skipped, so every field built from this stays position-aligned.
    fn with_resolved_attr<'a>(
        &'a self,
        selector: &'a Selector,
        attr: &'a str,
    ) -> impl Iterator<Item = (ElementRef<'a>, String)> + 'a {
        self.html.select(selector).filter_map(move |el| {
            let value = el.value().attr(attr)?.trim();
            if value.is_empty() || value.starts_with("javascript:") {
                return None;
            }
            Some((el, self.resolve(value)))
        })
    }

    fn tables(&self) -> Vec<Vec<String>> {
        self.html
            .select(&TABLES)
            .map(|table| {
                table
                    .select(&TABLE_ROWS)
                    .filter_map(|row| {
                        let cells: Vec<String> =
                            row.select(&TABLE_CELLS).map(|cell| element_text(&cell)).collect();
                        (!cells.is_empty()).then(|| cells.join(CELL_SEPARATOR))
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|rows| !rows.is_empty())
            .collect()
    }

    fn lists(&self) -> Vec<Vec<String>> {
        self.html
            .select(&LISTS)
            .map(|list| {
                list.select(&LIST_ITEMS)
                    .map(|item| element_text(&item))
                    .collect::<Vec<_>>()
            })
            .filter(|items| !items.is_empty())
            .collect()
    }

    fn forms(&self) -> Vec<Vec<String>> {
        self.html
            .select(&FORMS)
            .map(|form| {
                let method = form
                    .value()
                    .attr("method")
                    .map_or_else(|| "get".to_string(), |m| m.trim().to_ascii_lowercase());
                let action = form
                    .value()
                    .attr("action")
                    .map(str::trim)
                    .filter(|action| !action.is_empty())
                    .map(|action| self.resolve(action))
                    .unwrap_or_default();
                let mut entries = vec![format!("method={method} action={action}")];
                entries.extend(form.select(&FORM_CONTROLS).map(|control| form_control(&control)));
                entries
            })
            .collect()
    }

    fn resolve(&self, reference: &str) -> String {
        self.base_url
            .as_ref()
            .and_then(|base| base.join(reference).ok())
            .map_or_else(|| reference.to_string(), String::from)
    }

    fn body_text(&self) -> String {
        self.html
            .select(&BODY)
            .next()
            .map(visible_text)
            .unwrap_or_default()
    }
}

fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// `input type=email name=user id=user value=` style descriptor.
fn form_control(control: &ElementRef<'_>) -> String {
    let element = control.value();
    let mut descriptor = element.name().to_string();
    if element.name() == "input" {
        descriptor.push_str(" type=");
        descriptor.push_str(element.attr("type").unwrap_or("text"));
    }
    for key in ["name", "id", "value"] {
        descriptor.push(' ');
        descriptor.push_str(key);
        descriptor.push('=');
        descriptor.push_str(element.attr(key).unwrap_or_default());
    }
    descriptor
}
