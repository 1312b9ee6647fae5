use crate::core::normalizer::normalize_element;
use crate::domain::model::{PageResult, SelectorEntry, SelectorResult, DEFAULT_SELECTORS};
use crate::utils::error::ScrapeError;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;

const NO_TITLE: &str = "No Title";

fn non_alphanumeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9]").expect("static regex"))
}

/// Replaces every character outside `[A-Za-z0-9]` with `_`.
pub fn sanitize_selector(selector: &str) -> String {
    non_alphanumeric().replace_all(selector, "_").into_owned()
}

/// Key of the selector at 1-based `position`.
pub fn result_key(position: usize, selector: &str) -> String {
    format!("selector_{}_{}", position, sanitize_selector(selector))
}

fn error_key(position: usize) -> String {
    format!("selector_{}_error", position)
}

/// Selectors to run, falling back to the default set when none were given.
pub fn effective_selectors(selectors: &[String]) -> Vec<String> {
    if selectors.is_empty() {
        tracing::info!(
            "No selectors provided, using default: {}",
            DEFAULT_SELECTORS.join(", ")
        );
        DEFAULT_SELECTORS.iter().map(|s| s.to_string()).collect()
    } else {
        selectors.to_vec()
    }
}

fn page_title(document: &Html) -> String {
    let title = Selector::parse("title")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
        })
        .unwrap_or_default();

    if title.is_empty() {
        NO_TITLE.to_string()
    } else {
        title
    }
}

/// Runs one selector. An invalid selector yields an error placeholder.
pub fn run_selector(document: &Html, selector: &str) -> SelectorResult {
    match Selector::parse(selector) {
        Ok(parsed) => {
            let elements = document
                .select(&parsed)
                .enumerate()
                .map(|(index, element)| normalize_element(element, index))
                .collect();
            SelectorResult::matched(selector, elements)
        }
        Err(e) => {
            let message = e.to_string();
            let err = ScrapeError::Selector {
                selector: selector.to_string(),
                message: message.clone(),
            };
            tracing::warn!("{}", err);
            SelectorResult::failed(selector, message)
        }
    }
}

/// Applies every selector to a parsed document, in order.
pub fn extract_page(document: &Html, selectors: &[String], url: &str, timestamp: &str) -> PageResult {
    let selectors = effective_selectors(selectors);

    let selector_results = selectors
        .iter()
        .enumerate()
        .map(|(i, selector)| {
            let position = i + 1;
            let result = run_selector(document, selector);
            let key = if result.is_error() {
                error_key(position)
            } else {
                result_key(position, selector)
            };
            tracing::debug!("{} -> {} match(es)", key, result.count());
            SelectorEntry { key, result }
        })
        .collect();

    PageResult {
        url: url.to_string(),
        timestamp: timestamp.to_string(),
        title: page_title(document),
        selector_results,
    }
}

/// Parses `markup` and runs [`extract_page`] on it.
pub fn extract_from_markup(markup: &str, selectors: &[String], url: &str, timestamp: &str) -> PageResult {
    let document = Html::parse_document(markup);
    extract_page(&document, selectors, url, timestamp)
}
