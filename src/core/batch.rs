use crate::core::extraction::extract_from_markup;
use crate::domain::model::PageResult;
use crate::domain::ports::Fetcher;
use crate::utils::error::Result;
use chrono::{SecondsFormat, Utc};
use std::time::Duration;

/// ISO-8601 capture time with millisecond precision, e.g. `2024-01-01T12:00:00.000Z`.
pub fn capture_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUrl {
    pub url: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub pages: Vec<PageResult>,
    pub failures: Vec<FailedUrl>,
}

/// Fetches pages one at a time and runs the extraction pass on each.
pub struct BatchScraper<'a, F: Fetcher> {
    fetcher: &'a F,
    selectors: &'a [String],
    delay: Duration,
}

impl<'a, F: Fetcher> BatchScraper<'a, F> {
    pub fn new(fetcher: &'a F, selectors: &'a [String]) -> Self {
        Self {
            fetcher,
            selectors,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fetch + extract for one URL. Only the fetch can fail.
    pub async fn scrape_url(&self, url: &str) -> Result<PageResult> {
        tracing::info!("Scraping: {}", url);
        if !self.selectors.is_empty() {
            tracing::info!("Target selectors: {}", self.selectors.join(", "));
        }

        let markup = self.fetcher.fetch(url).await?;
        Ok(extract_from_markup(
            &markup,
            self.selectors,
            url,
            &capture_timestamp(),
        ))
    }

    /// Scrapes every URL in order. A failing URL is logged and skipped;
    /// the delay is applied between consecutive URLs only.
    pub async fn scrape_all(&self, urls: &[String]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for (i, url) in urls.iter().enumerate() {
            tracing::info!("--- Processing {}/{} ---", i + 1, urls.len());
            match self.scrape_url(url).await {
                Ok(page) => outcome.pages.push(page),
                Err(e) => {
                    tracing::warn!("Failed to scrape {}: {}", url, e);
                    outcome.failures.push(FailedUrl {
                        url: url.clone(),
                        message: e.to_string(),
                    });
                }
            }

            if !self.delay.is_zero() && i + 1 < urls.len() {
                tracing::info!("Waiting {} seconds...", self.delay.as_secs_f64());
                tokio::time::sleep(self.delay).await;
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ScrapeError;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    #[derive(Clone, Default)]
    struct MockFetcher {
        pages: HashMap<String, String>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl MockFetcher {
        fn with_page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Fetcher for MockFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.calls.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| ScrapeError::fetch(url, "connection refused"))
        }
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_capture_timestamp_format() {
        let ts = capture_timestamp();
        assert_eq!(ts.len(), "2024-01-01T12:00:00.000Z".len());
        assert!(ts.ends_with('Z'));
    }

    #[tokio::test]
    async fn test_failed_url_is_skipped_and_order_kept() {
        let fetcher = MockFetcher::default()
            .with_page("https://a.test/", "<title>A</title><h1>a</h1>")
            .with_page("https://c.test/", "<title>C</title><h1>c</h1>");
        let selectors = urls(&["h1"]);
        let scraper = BatchScraper::new(&fetcher, &selectors);

        let outcome = scraper
            .scrape_all(&urls(&["https://a.test/", "https://b.test/", "https://c.test/"]))
            .await;

        assert_eq!(outcome.pages.len(), 2);
        assert_eq!(outcome.pages[0].url, "https://a.test/");
        assert_eq!(outcome.pages[1].url, "https://c.test/");
        assert_eq!(outcome.pages[1].title, "C");

        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].url, "https://b.test/");
        assert!(outcome.failures[0].message.contains("connection refused"));

        assert_eq!(fetcher.calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_only_between_urls() {
        let fetcher = MockFetcher::default()
            .with_page("https://a.test/", "<h1>a</h1>")
            .with_page("https://b.test/", "<h1>b</h1>");
        let selectors: Vec<String> = Vec::new();
        let scraper = BatchScraper::new(&fetcher, &selectors).with_delay(Duration::from_millis(300));

        let started = Instant::now();
        let outcome = scraper
            .scrape_all(&urls(&["https://a.test/", "https://b.test/"]))
            .await;
        let elapsed = started.elapsed();

        assert_eq!(outcome.pages.len(), 2);
        // one gap for two URLs, none after the last
        assert_eq!(elapsed, Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_single_url_failure_propagates() {
        let fetcher = MockFetcher::default();
        let selectors: Vec<String> = Vec::new();
        let scraper = BatchScraper::new(&fetcher, &selectors);

        let err = scraper.scrape_url("https://down.test/").await.unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch { .. }));
    }
}
