use crate::core::ConfigProvider;
use crate::domain::model::{FlattenMode, HeaderPolicy};
use crate::domain::ports::{
    FetchConfig, DEFAULT_DELAY_MS, DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT,
};
use crate::utils::error::{Result, ScrapeError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Batch scrape job loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    pub scrape: ScrapeSection,
    #[serde(default)]
    pub fetch: FetchSection,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeSection {
    pub urls: Vec<String>,
    #[serde(default)]
    pub selectors: Vec<String>,
    #[serde(default)]
    pub mode: FlattenMode,
    #[serde(default)]
    pub text_only: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchSection {
    pub timeout_ms: Option<u64>,
    pub user_agent: Option<String>,
    pub max_redirects: Option<usize>,
    pub delay_ms: Option<u64>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_output_path")]
    pub path: String,
    pub filename: Option<String>,
    #[serde(default)]
    pub save_json: bool,
    #[serde(default)]
    pub header_policy: HeaderPolicy,
}

fn default_output_path() -> String {
    ".".to_string()
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            filename: None,
            save_json: false,
            header_policy: HeaderPolicy::default(),
        }
    }
}

impl BatchConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScrapeError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScrapeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${BASE_URL})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ScrapeError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if self.scrape.urls.is_empty() {
            return Err(ScrapeError::MissingConfigError {
                field: "scrape.urls".to_string(),
            });
        }
        for url in &self.scrape.urls {
            validate_url("scrape.urls", url)?;
        }
        for selector in &self.scrape.selectors {
            validate_non_empty_string("scrape.selectors", selector)?;
        }

        if let Some(timeout) = self.fetch.timeout_ms {
            validate_range("fetch.timeout_ms", timeout, 1, 600_000)?;
        }
        if let Some(redirects) = self.fetch.max_redirects {
            validate_range("fetch.max_redirects", redirects, 0, 20)?;
        }

        validate_path("output.path", &self.output.path)?;
        if let Some(filename) = &self.output.filename {
            validate_path("output.filename", filename)?;
        }

        Ok(())
    }
}

impl ConfigProvider for BatchConfig {
    fn urls(&self) -> &[String] {
        &self.scrape.urls
    }

    fn selectors(&self) -> &[String] {
        &self.scrape.selectors
    }

    fn mode(&self) -> FlattenMode {
        self.scrape.mode
    }

    fn text_only(&self) -> bool {
        self.scrape.text_only
    }

    fn header_policy(&self) -> HeaderPolicy {
        self.output.header_policy
    }

    fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            user_agent: self
                .fetch
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            timeout_ms: self.fetch.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
            max_redirects: self.fetch.max_redirects.unwrap_or(DEFAULT_MAX_REDIRECTS),
            headers: self.fetch.headers.clone(),
        }
    }

    fn delay_ms(&self) -> u64 {
        self.fetch.delay_ms.unwrap_or(DEFAULT_DELAY_MS)
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn save_json(&self) -> bool {
        self.output.save_json
    }

    fn output_filename(&self) -> Option<&str> {
        self.output.filename.as_deref()
    }
}

impl Validate for BatchConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
