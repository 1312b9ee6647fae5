use crate::domain::model::PageResult;
use std::fmt::Write;

const PREVIEW_ELEMENTS: usize = 5;
const PREVIEW_CHARS: usize = 100;

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Human-readable summary of one page's extraction results.
pub fn render_page(page: &PageResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n=== SCRAPING RESULTS ===");
    let _ = writeln!(out, "URL: {}", page.url);
    let _ = writeln!(out, "Title: {}", page.title);

    for entry in &page.selector_results {
        let result = &entry.result;
        let _ = writeln!(out, "\n--- {} ({} found) ---", result.selector(), result.count());

        if let Some(error) = result.error() {
            let _ = writeln!(out, "❌ Error: {}", error);
        } else if result.elements().is_empty() {
            let _ = writeln!(out, "   No elements found");
        } else {
            for (i, element) in result.elements().iter().take(PREVIEW_ELEMENTS).enumerate() {
                let _ = writeln!(out, "{}. {}", i + 1, preview(&element.text));
                if !element.details.href().is_empty() {
                    let _ = writeln!(out, "   Link: {}", element.details.href());
                }
                if !element.details.src().is_empty() {
                    let _ = writeln!(out, "   Image: {}", element.details.src());
                }
            }
            if result.elements().len() > PREVIEW_ELEMENTS {
                let _ = writeln!(
                    out,
                    "   ... and {} more",
                    result.elements().len() - PREVIEW_ELEMENTS
                );
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extraction::extract_from_markup;

    #[test]
    fn test_render_page_preview() {
        let long = "x".repeat(120);
        let html = format!(
            r#"<title>T</title>
            <p>{}</p><p>2</p><p>3</p><p>4</p><p>5</p><p>6</p><p>7</p>
            <a href="/x">go</a><img src="/i.png">"#,
            long
        );
        let selectors: Vec<String> = ["p", "a", "img", "table", "p[["]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let page = extract_from_markup(&html, &selectors, "https://example.com", "t");

        let out = render_page(&page);

        assert!(out.contains("Title: T"));
        assert!(out.contains("--- p (7 found) ---"));
        assert!(out.contains(&format!("1. {}...", "x".repeat(100))));
        assert!(out.contains("   ... and 2 more"));
        assert!(out.contains("   Link: /x"));
        assert!(out.contains("   Image: /i.png"));
        assert!(out.contains("--- table (0 found) ---\n   No elements found"));
        assert!(out.contains("❌ Error: "));
    }
}
