//! Collapses page results into flat rows for tabular output.

use crate::core::extraction::sanitize_selector;
use crate::domain::model::{ElementRecord, FlatRow, FlattenMode, PageResult};
use regex::Regex;
use std::sync::OnceLock;

const JOIN_SEPARATOR: &str = " | ";

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Normalizes a text field for a single CSV cell: line breaks become
/// spaces, whitespace runs collapse to one space, ends are trimmed.
///
/// Quote escaping is left to the encoder.
pub fn clean_for_csv(text: &str) -> String {
    let single_line = text.replace("\r\n", " ").replace('\n', " ");
    whitespace_run()
        .replace_all(&single_line, " ")
        .trim()
        .to_string()
}

fn separate_row(page: &PageResult, selector: &str, element: &ElementRecord, text_only: bool) -> FlatRow {
    if text_only {
        return FlatRow::new()
            .with("url", page.url.as_str())
            .with("selector", selector)
            .with("text_content", clean_for_csv(&element.text));
    }

    let details = &element.details;
    FlatRow::new()
        .with("url", page.url.as_str())
        .with("timestamp", page.timestamp.as_str())
        .with("page_title", clean_for_csv(&page.title))
        .with("selector", selector)
        .with("element_index", element.index)
        .with("tag_name", element.tag_name.as_str())
        .with("text_content", clean_for_csv(&element.text))
        .with("html_content", clean_for_csv(&element.html))
        .with("href", clean_for_csv(details.href()))
        .with("src", clean_for_csv(details.src()))
        .with("alt", clean_for_csv(details.alt()))
        .with("title_attr", clean_for_csv(details.title()))
        .with("id", clean_for_csv(&element.id))
        .with("class", clean_for_csv(&element.class))
        .with("type", clean_for_csv(details.input_type()))
        .with("name", clean_for_csv(details.name()))
        .with("value", clean_for_csv(details.value()))
        .with("width", clean_for_csv(details.width()))
        .with("height", clean_for_csv(details.height()))
}

/// One row per matched element; error placeholders contribute nothing.
pub fn flatten_separate(page: &PageResult, text_only: bool) -> Vec<FlatRow> {
    page.selector_results
        .iter()
        .flat_map(|entry| {
            let selector = entry.result.selector();
            entry
                .result
                .elements()
                .iter()
                .map(move |element| separate_row(page, selector, element, text_only))
        })
        .collect()
}

fn non_empty<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    values.filter(|value| !value.is_empty()).collect()
}

/// Exactly one row for the page with per-selector summary columns.
///
/// The `<sel>_hrefs` column only exists when some element has an href, so
/// rows of different pages can have different column sets.
pub fn flatten_combined(page: &PageResult, text_only: bool) -> FlatRow {
    let mut row = FlatRow::new()
        .with("url", page.url.as_str())
        .with("timestamp", page.timestamp.as_str())
        .with("page_title", clean_for_csv(&page.title));

    for entry in &page.selector_results {
        let result = &entry.result;
        let name = sanitize_selector(result.selector());

        let texts = non_empty(result.elements().iter().map(|el| el.text.as_str()));
        row.insert(format!("{}_count", name), result.count());
        row.insert(format!("{}_texts", name), clean_for_csv(&texts.join(JOIN_SEPARATOR)));

        if !text_only {
            let hrefs = non_empty(result.elements().iter().map(|el| el.details.href()));
            if !hrefs.is_empty() {
                row.insert(format!("{}_hrefs", name), clean_for_csv(&hrefs.join(JOIN_SEPARATOR)));
            }
        }
    }

    row
}

pub fn flatten_page(page: &PageResult, mode: FlattenMode, text_only: bool) -> Vec<FlatRow> {
    match mode {
        FlattenMode::Separate => flatten_separate(page, text_only),
        FlattenMode::Combined => vec![flatten_combined(page, text_only)],
    }
}

/// Flattens every page in order and concatenates the rows.
pub fn flatten_pages(pages: &[PageResult], mode: FlattenMode, text_only: bool) -> Vec<FlatRow> {
    pages
        .iter()
        .flat_map(|page| flatten_page(page, mode, text_only))
        .collect()
}
