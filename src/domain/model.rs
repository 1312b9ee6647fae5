use serde::{Deserialize, Serialize};
use std::fmt;

/// Selectors used when the caller supplies none.
pub const DEFAULT_SELECTORS: [&str; 4] = ["h1", "h2", "p", "a"];

/// Tag-specific attribute subset of a matched element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementDetails {
    Anchor {
        href: String,
        title: String,
        target: String,
    },
    Image {
        src: String,
        alt: String,
        width: String,
        height: String,
    },
    FormControl {
        #[serde(rename = "type")]
        input_type: String,
        name: String,
        value: String,
        placeholder: String,
    },
    Meta {
        name: String,
        property: String,
        content: String,
    },
    Other,
}

impl ElementDetails {
    pub fn href(&self) -> &str {
        match self {
            ElementDetails::Anchor { href, .. } => href,
            _ => "",
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ElementDetails::Anchor { title, .. } => title,
            _ => "",
        }
    }

    pub fn src(&self) -> &str {
        match self {
            ElementDetails::Image { src, .. } => src,
            _ => "",
        }
    }

    pub fn alt(&self) -> &str {
        match self {
            ElementDetails::Image { alt, .. } => alt,
            _ => "",
        }
    }

    pub fn width(&self) -> &str {
        match self {
            ElementDetails::Image { width, .. } => width,
            _ => "",
        }
    }

    pub fn height(&self) -> &str {
        match self {
            ElementDetails::Image { height, .. } => height,
            _ => "",
        }
    }

    pub fn input_type(&self) -> &str {
        match self {
            ElementDetails::FormControl { input_type, .. } => input_type,
            _ => "",
        }
    }

    /// `name` is carried by both form controls and meta tags.
    pub fn name(&self) -> &str {
        match self {
            ElementDetails::FormControl { name, .. } | ElementDetails::Meta { name, .. } => name,
            _ => "",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            ElementDetails::FormControl { value, .. } => value,
            _ => "",
        }
    }
}

/// Normalized record of one matched element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub index: usize,
    pub tag_name: String,
    pub text: String,
    pub html: String,
    pub id: String,
    pub class: String,
    #[serde(flatten)]
    pub details: ElementDetails,
}

/// Outcome of running one selector against a document.
///
/// Either a match list or an error placeholder; the constructors keep the
/// two shapes apart so `count` always agrees with `elements`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorResult {
    selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    count: usize,
    elements: Vec<ElementRecord>,
}

impl SelectorResult {
    pub fn matched(selector: impl Into<String>, elements: Vec<ElementRecord>) -> Self {
        Self {
            selector: selector.into(),
            error: None,
            count: elements.len(),
            elements,
        }
    }

    pub fn failed(selector: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            error: Some(error.into()),
            count: 0,
            elements: Vec::new(),
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn elements(&self) -> &[ElementRecord] {
        &self.elements
    }
}

/// A selector result together with its position-derived key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorEntry {
    pub key: String,
    #[serde(flatten)]
    pub result: SelectorResult,
}

/// Everything extracted from one fetched page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    pub url: String,
    pub timestamp: String,
    pub title: String,
    pub selector_results: Vec<SelectorEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlattenMode {
    /// One row per matched element.
    #[default]
    Separate,
    /// One row per page with aggregated per-selector columns.
    Combined,
}

impl FlattenMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlattenMode::Separate => "separate",
            FlattenMode::Combined => "combined",
        }
    }
}

impl fmt::Display for FlattenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the CSV header is derived from a batch of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeaderPolicy {
    /// Keys of the first row only. Extra keys in later rows are dropped and
    /// missing keys are written as empty fields.
    #[default]
    FirstRow,
    /// Ordered union of every row's keys, in first-seen order.
    Union,
}

/// Scalar cell value of a flat row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FlatValue {
    Text(String),
    Number(usize),
}

impl FlatValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FlatValue::Text(s) => Some(s),
            FlatValue::Number(_) => None,
        }
    }
}

impl fmt::Display for FlatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlatValue::Text(s) => f.write_str(s),
            FlatValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<String> for FlatValue {
    fn from(value: String) -> Self {
        FlatValue::Text(value)
    }
}

impl From<&str> for FlatValue {
    fn from(value: &str) -> Self {
        FlatValue::Text(value.to_string())
    }
}

impl From<usize> for FlatValue {
    fn from(value: usize) -> Self {
        FlatValue::Number(value)
    }
}

/// Insertion-ordered column → value mapping.
///
/// Re-inserting an existing column overwrites its value in place, so the
/// column keeps the position of its first insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRow {
    cells: Vec<(String, FlatValue)>,
}

impl FlatRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<FlatValue>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<FlatValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&FlatValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub pages: Vec<PageResult>,
    pub rows: Vec<FlatRow>,
    pub columns: usize,
    /// `None` when flattening produced no rows.
    pub csv_output: Option<String>,
}
