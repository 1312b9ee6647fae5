use crate::core::ConfigProvider;
use crate::domain::model::{FlattenMode, HeaderPolicy};
use crate::domain::ports::{FetchConfig, DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT};
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_range, validate_url, Validate};
use clap::Parser;
use std::slice;

#[derive(Debug, Clone, Parser)]
#[command(name = "selective-scraper")]
#[command(about = "Fetch a page, pick elements with CSS selectors and save them as CSV")]
#[command(after_help = "Examples:
  selective-scraper https://example.com h1 h2 p
  selective-scraper https://example.com \"a[href]\" \".product-title\"
  selective-scraper https://example.com --combined h1 p a
  selective-scraper https://example.com --text-only a

Default selectors when none are given: h1 h2 p a")]
pub struct CliConfig {
    /// Page to scrape
    pub url: String,

    /// CSS selectors to extract
    pub selectors: Vec<String>,

    /// One row per URL instead of one row per element
    #[arg(long)]
    pub combined: bool,

    /// Keep only URL, selector and text columns
    #[arg(long)]
    pub text_only: bool,

    /// Directory the CSV is written to
    #[arg(long, default_value = ".")]
    pub output_path: String,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Also write the raw extraction results as JSON
    #[arg(long)]
    pub save_json: bool,

    /// Build the CSV header from every row instead of the first one
    #[arg(long)]
    pub union_columns: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn urls(&self) -> &[String] {
        slice::from_ref(&self.url)
    }

    fn selectors(&self) -> &[String] {
        &self.selectors
    }

    fn mode(&self) -> FlattenMode {
        if self.combined {
            FlattenMode::Combined
        } else {
            FlattenMode::Separate
        }
    }

    fn text_only(&self) -> bool {
        self.text_only
    }

    fn header_policy(&self) -> HeaderPolicy {
        if self.union_columns {
            HeaderPolicy::Union
        } else {
            HeaderPolicy::FirstRow
        }
    }

    fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            user_agent: self.user_agent.clone(),
            timeout_ms: self.timeout_ms,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            ..FetchConfig::default()
        }
    }

    fn delay_ms(&self) -> u64 {
        0
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn save_json(&self) -> bool {
        self.save_json
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("url", &self.url)?;
        for selector in &self.selectors {
            validate_non_empty_string("selectors", selector)?;
        }
        validate_path("output_path", &self.output_path)?;
        validate_range("timeout_ms", self.timeout_ms, 1, 600_000)?;
        Ok(())
    }
}
