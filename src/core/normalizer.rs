//! Turns a matched document node into an [`ElementRecord`].

use crate::domain::model::{ElementDetails, ElementRecord};
use scraper::{ElementRef, Selector};
use std::sync::OnceLock;

fn attr(element: &ElementRef<'_>, name: &str) -> String {
    element.value().attr(name).unwrap_or_default().to_string()
}

fn trimmed_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn selected_option() -> &'static Selector {
    static SELECTED: OnceLock<Selector> = OnceLock::new();
    SELECTED.get_or_init(|| Selector::parse("option[selected]").expect("static selector"))
}

fn any_option() -> &'static Selector {
    static OPTION: OnceLock<Selector> = OnceLock::new();
    OPTION.get_or_init(|| Selector::parse("option").expect("static selector"))
}

fn option_value(option: ElementRef<'_>) -> String {
    match option.value().attr("value") {
        Some(value) => value.to_string(),
        None => trimmed_text(&option),
    }
}

/// A single-choice select with nothing marked selected shows its first option.
fn select_value(element: &ElementRef<'_>) -> String {
    let selected = element.select(selected_option()).next();
    let chosen = match selected {
        Some(option) => Some(option),
        None if element.value().attr("multiple").is_none() => element.select(any_option()).next(),
        None => None,
    };
    chosen.map(option_value).unwrap_or_default()
}

/// Current value of a form control when it carries no `value` attribute.
fn form_value(element: &ElementRef<'_>, tag: &str) -> String {
    match tag {
        "textarea" => element.text().collect(),
        "select" => select_value(element),
        _ => String::new(),
    }
}

fn details_for(element: &ElementRef<'_>, tag: &str) -> ElementDetails {
    match tag {
        "a" => ElementDetails::Anchor {
            href: attr(element, "href"),
            title: attr(element, "title"),
            target: attr(element, "target"),
        },
        "img" => ElementDetails::Image {
            src: attr(element, "src"),
            alt: attr(element, "alt"),
            width: attr(element, "width"),
            height: attr(element, "height"),
        },
        "input" | "textarea" | "select" => {
            let value = match element.value().attr("value") {
                Some(value) if !value.is_empty() => value.to_string(),
                _ => form_value(element, tag),
            };
            ElementDetails::FormControl {
                input_type: attr(element, "type"),
                name: attr(element, "name"),
                value,
                placeholder: attr(element, "placeholder"),
            }
        }
        "meta" => ElementDetails::Meta {
            name: attr(element, "name"),
            property: attr(element, "property"),
            content: attr(element, "content"),
        },
        _ => ElementDetails::Other,
    }
}

/// Normalizes the `index`-th match of a selector.
pub fn normalize_element(element: ElementRef<'_>, index: usize) -> ElementRecord {
    let tag_name = element.value().name().to_ascii_lowercase();
    let details = details_for(&element, &tag_name);

    ElementRecord {
        index,
        text: trimmed_text(&element),
        html: element.inner_html(),
        id: attr(&element, "id"),
        class: attr(&element, "class"),
        details,
        tag_name,
    }
}
