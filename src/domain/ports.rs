use crate::domain::model::{FlattenMode, HeaderPolicy, PageResult, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_MAX_REDIRECTS: usize = 5;
pub const DEFAULT_DELAY_MS: u64 = 2_000;

/// Request settings handed to the fetch collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_ms: u64,
    pub max_redirects: usize,
    /// Merged over the defaults; a caller `User-Agent` wins.
    pub headers: HashMap<String, String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            headers: HashMap::new(),
        }
    }
}

pub trait Fetcher: Send + Sync {
    /// Returns the raw markup of `url` or a `Fetch` error.
    fn fetch(&self, url: &str) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn urls(&self) -> &[String];
    fn selectors(&self) -> &[String];
    fn mode(&self) -> FlattenMode;
    fn text_only(&self) -> bool;
    fn header_policy(&self) -> HeaderPolicy;
    fn fetch_config(&self) -> FetchConfig;
    fn delay_ms(&self) -> u64;
    fn output_path(&self) -> &str;
    fn save_json(&self) -> bool;

    /// Fixed output file name; `None` derives one from mode and time.
    fn output_filename(&self) -> Option<&str> {
        None
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<PageResult>>;
    async fn transform(&self, pages: Vec<PageResult>) -> Result<TransformResult>;
    /// Persists the result and returns the written CSV path, if any.
    async fn load(&self, result: &TransformResult) -> Result<Option<String>>;
}
