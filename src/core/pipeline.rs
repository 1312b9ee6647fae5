use crate::adapters::http::HttpFetcher;
use crate::core::batch::BatchScraper;
use crate::core::csv_encoder::{encode_rows, header_for};
use crate::core::flatten::flatten_pages;
use crate::core::{ConfigProvider, Fetcher, PageResult, Pipeline, Storage, TransformResult};
use crate::domain::model::FlattenMode;
use crate::utils::error::{Result, ScrapeError};
use chrono::{DateTime, SecondsFormat, Utc};
use std::time::Duration;

/// `scraped_selective_<mode>[_text_only]_<timestamp>.csv`, with `:` and `.`
/// in the timestamp replaced by `-`.
pub fn output_filename(mode: FlattenMode, text_only: bool, now: DateTime<Utc>) -> String {
    let timestamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    let text_mode = if text_only { "_text_only" } else { "" };
    format!("scraped_selective_{}{}_{}.csv", mode, text_mode, timestamp)
}

pub struct ScrapePipeline<S: Storage, C: ConfigProvider, F: Fetcher = HttpFetcher> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) fetcher: F,
}

impl<S: Storage, C: ConfigProvider> ScrapePipeline<S, C, HttpFetcher> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.fetch_config())?;
        Ok(Self::with_fetcher(storage, config, fetcher))
    }
}

impl<S: Storage, C: ConfigProvider, F: Fetcher> ScrapePipeline<S, C, F> {
    pub fn with_fetcher(storage: S, config: C, fetcher: F) -> Self {
        Self {
            storage,
            config,
            fetcher,
        }
    }

    fn csv_filename(&self) -> String {
        match self.config.output_filename() {
            Some(name) => name.to_string(),
            None => output_filename(self.config.mode(), self.config.text_only(), Utc::now()),
        }
    }

    async fn write(&self, filename: &str, data: &[u8]) -> Result<()> {
        self.storage
            .write_file(filename, data)
            .await
            .map_err(|e| ScrapeError::EncodeWrite {
                path: format!("{}/{}", self.config.output_path(), filename),
                message: e.to_string(),
            })
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, F: Fetcher> Pipeline for ScrapePipeline<S, C, F> {
    async fn extract(&self) -> Result<Vec<PageResult>> {
        let urls = self.config.urls();
        let scraper = BatchScraper::new(&self.fetcher, self.config.selectors())
            .with_delay(Duration::from_millis(self.config.delay_ms()));

        // a lone URL has nothing to isolate its failure from
        if let [url] = urls {
            let page = scraper.scrape_url(url).await?;
            return Ok(vec![page]);
        }

        let outcome = scraper.scrape_all(urls).await;
        if !outcome.failures.is_empty() {
            tracing::warn!(
                "{} of {} URL(s) failed",
                outcome.failures.len(),
                urls.len()
            );
        }
        Ok(outcome.pages)
    }

    async fn transform(&self, pages: Vec<PageResult>) -> Result<TransformResult> {
        let rows = flatten_pages(&pages, self.config.mode(), self.config.text_only());
        let policy = self.config.header_policy();
        let csv_output = encode_rows(&rows, policy)?;
        let columns = header_for(&rows, policy).len();

        tracing::debug!(
            "Flattened {} page(s) into {} row(s) x {} column(s)",
            pages.len(),
            rows.len(),
            columns
        );

        Ok(TransformResult {
            pages,
            rows,
            columns,
            csv_output,
        })
    }

    async fn load(&self, result: &TransformResult) -> Result<Option<String>> {
        let Some(csv) = &result.csv_output else {
            tracing::warn!("No data extracted for CSV");
            return Ok(None);
        };

        let filename = self.csv_filename();
        tracing::debug!("Writing {} bytes to {}", csv.len(), filename);
        self.write(&filename, csv.as_bytes()).await?;

        if self.config.save_json() {
            let json_name = match filename.strip_suffix(".csv") {
                Some(stem) => format!("{}.json", stem),
                None => format!("{}.json", filename),
            };
            let json = serde_json::to_string_pretty(&result.pages)?;
            self.write(&json_name, json.as_bytes()).await?;
        }

        tracing::info!("Total rows: {}", result.rows.len());
        tracing::info!("Columns: {}", result.columns);
        Ok(Some(format!("{}/{}", self.config.output_path(), filename)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::HeaderPolicy;
    use crate::domain::ports::FetchConfig;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        read_only: bool,
    }

    impl MockStorage {
        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }

        async fn file_names(&self) -> Vec<String> {
            let mut names: Vec<String> = self.files.lock().await.keys().cloned().collect();
            names.sort();
            names
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            if self.read_only {
                return Err(ScrapeError::IoError(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only file system",
                )));
            }
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct MockFetcher {
        pages: HashMap<String, String>,
    }

    impl Fetcher for MockFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| ScrapeError::fetch(url, "timeout of 15000ms exceeded"))
        }
    }

    struct MockConfig {
        urls: Vec<String>,
        selectors: Vec<String>,
        mode: FlattenMode,
        text_only: bool,
        save_json: bool,
    }

    impl MockConfig {
        fn new(urls: &[&str], selectors: &[&str]) -> Self {
            Self {
                urls: urls.iter().map(|s| s.to_string()).collect(),
                selectors: selectors.iter().map(|s| s.to_string()).collect(),
                mode: FlattenMode::Separate,
                text_only: false,
                save_json: false,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn urls(&self) -> &[String] {
            &self.urls
        }

        fn selectors(&self) -> &[String] {
            &self.selectors
        }

        fn mode(&self) -> FlattenMode {
            self.mode
        }

        fn text_only(&self) -> bool {
            self.text_only
        }

        fn header_policy(&self) -> HeaderPolicy {
            HeaderPolicy::FirstRow
        }

        fn fetch_config(&self) -> FetchConfig {
            FetchConfig::default()
        }

        fn delay_ms(&self) -> u64 {
            0
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn save_json(&self) -> bool {
            self.save_json
        }

        fn output_filename(&self) -> Option<&str> {
            Some("out.csv")
        }
    }

    const PAGE: &str = r#"<title>Shop</title><h1>Deals</h1><p>Cheap, "fast"</p><p></p><a href="/x">link</a>"#;

    fn fetcher() -> MockFetcher {
        let mut pages = HashMap::new();
        pages.insert("https://a.test/".to_string(), PAGE.to_string());
        pages.insert("https://c.test/".to_string(), "<h1>Other</h1>".to_string());
        MockFetcher { pages }
    }

    #[test]
    fn test_output_filename() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 10, 20, 30).unwrap();
        assert_eq!(
            output_filename(FlattenMode::Combined, true, now),
            "scraped_selective_combined_text_only_2024-03-05T10-20-30-000Z.csv"
        );
        assert_eq!(
            output_filename(FlattenMode::Separate, false, now),
            "scraped_selective_separate_2024-03-05T10-20-30-000Z.csv"
        );
    }

    #[tokio::test]
    async fn test_extract_single_url_failure_is_fatal() {
        let config = MockConfig::new(&["https://down.test/"], &["h1"]);
        let pipeline = ScrapePipeline::with_fetcher(MockStorage::default(), config, fetcher());

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_extract_batch_isolates_failures() {
        let config = MockConfig::new(
            &["https://a.test/", "https://down.test/", "https://c.test/"],
            &["h1"],
        );
        let pipeline = ScrapePipeline::with_fetcher(MockStorage::default(), config, fetcher());

        let pages = pipeline.extract().await.unwrap();
        let urls: Vec<&str> = pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.test/", "https://c.test/"]);
    }

    #[tokio::test]
    async fn test_transform_and_load_separate() {
        let storage = MockStorage::default();
        let config = MockConfig::new(&["https://a.test/"], &["h1", "p", "a"]);
        let pipeline = ScrapePipeline::with_fetcher(storage.clone(), config, fetcher());

        let pages = pipeline.extract().await.unwrap();
        let result = pipeline.transform(pages).await.unwrap();
        assert_eq!(result.rows.len(), 4);
        assert_eq!(result.columns, 19);

        let path = pipeline.load(&result).await.unwrap();
        assert_eq!(path.as_deref(), Some("test_output/out.csv"));

        let csv = String::from_utf8(storage.get_file("out.csv").await.unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("url,timestamp,page_title,selector,element_index"));
        assert!(lines[2].contains(r#""Cheap, ""fast""""#));
    }

    #[tokio::test]
    async fn test_load_without_rows_writes_nothing() {
        let storage = MockStorage::default();
        let config = MockConfig::new(&["https://a.test/"], &["table"]);
        let pipeline = ScrapePipeline::with_fetcher(storage.clone(), config, fetcher());

        let pages = pipeline.extract().await.unwrap();
        let result = pipeline.transform(pages).await.unwrap();
        assert!(result.csv_output.is_none());

        assert_eq!(pipeline.load(&result).await.unwrap(), None);
        assert!(storage.file_names().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_with_json_dump() {
        let storage = MockStorage::default();
        let mut config = MockConfig::new(&["https://a.test/"], &["a"]);
        config.mode = FlattenMode::Combined;
        config.save_json = true;
        let pipeline = ScrapePipeline::with_fetcher(storage.clone(), config, fetcher());

        let pages = pipeline.extract().await.unwrap();
        let result = pipeline.transform(pages).await.unwrap();
        pipeline.load(&result).await.unwrap();

        assert_eq!(storage.file_names().await, vec!["out.csv", "out.json"]);
        let json: serde_json::Value =
            serde_json::from_slice(&storage.get_file("out.json").await.unwrap()).unwrap();
        assert_eq!(json[0]["title"], "Shop");
        assert_eq!(json[0]["selector_results"][0]["key"], "selector_1_a");
        assert_eq!(json[0]["selector_results"][0]["elements"][0]["href"], "/x");
    }

    #[tokio::test]
    async fn test_load_write_failure_is_encode_write_error() {
        let storage = MockStorage {
            read_only: true,
            ..MockStorage::default()
        };
        let config = MockConfig::new(&["https://a.test/"], &["h1"]);
        let pipeline = ScrapePipeline::with_fetcher(storage, config, fetcher());

        let pages = pipeline.extract().await.unwrap();
        let result = pipeline.transform(pages).await.unwrap();
        let err = pipeline.load(&result).await.unwrap_err();

        match err {
            ScrapeError::EncodeWrite { path, message } => {
                assert_eq!(path, "test_output/out.csv");
                assert!(message.contains("read-only"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
