use crate::domain::ports::{FetchConfig, Fetcher};
use crate::utils::error::{Result, ScrapeError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{redirect, Client};
use std::time::Duration;

/// `Fetcher` backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

fn default_headers(config: &FetchConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let user_agent = HeaderValue::from_str(&config.user_agent).map_err(|e| {
        ScrapeError::InvalidConfigValueError {
            field: "fetch.user_agent".to_string(),
            value: config.user_agent.clone(),
            reason: e.to_string(),
        }
    })?;
    headers.insert(USER_AGENT, user_agent);

    for (key, value) in &config.headers {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            ScrapeError::InvalidConfigValueError {
                field: "fetch.headers".to_string(),
                value: key.clone(),
                reason: e.to_string(),
            }
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| ScrapeError::InvalidConfigValueError {
            field: format!("fetch.headers.{}", key),
            value: value.clone(),
            reason: e.to_string(),
        })?;
        headers.insert(name, value);
    }

    Ok(headers)
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .default_headers(default_headers(config)?)
            .timeout(Duration::from_millis(config.timeout_ms))
            .redirect(redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| ScrapeError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        tracing::debug!("Making request to: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::fetch(url, e))?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);
        if !status.is_success() {
            return Err(ScrapeError::fetch(
                url,
                format!("Request failed with status code {}", status.as_u16()),
            ));
        }

        response.text().await.map_err(|e| ScrapeError::fetch(url, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_fetch_returns_body_with_user_agent() {
        let server = MockServer::start();
        let page_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/page")
                .header("user-agent", "test-agent/1.0")
                .header("x-trace", "abc");
            then.status(200)
                .header("Content-Type", "text/html")
                .body("<h1>Hello</h1>");
        });

        let mut config = FetchConfig {
            user_agent: "test-agent/1.0".to_string(),
            ..FetchConfig::default()
        };
        config.headers.insert("X-Trace".to_string(), "abc".to_string());
        let fetcher = HttpFetcher::new(&config).unwrap();

        let body = fetcher.fetch(&server.url("/page")).await.unwrap();

        page_mock.assert();
        assert_eq!(body, "<h1>Hello</h1>");
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });

        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
        let err = fetcher.fetch(&server.url("/missing")).await.unwrap_err();

        match err {
            ScrapeError::Fetch { url, message } => {
                assert!(url.ends_with("/missing"));
                assert!(message.contains("404"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_fetch_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200)
                .delay(Duration::from_millis(500))
                .body("late");
        });

        let config = FetchConfig {
            timeout_ms: 50,
            ..FetchConfig::default()
        };
        let fetcher = HttpFetcher::new(&config).unwrap();
        let err = fetcher.fetch(&server.url("/slow")).await.unwrap_err();

        assert!(matches!(err, ScrapeError::Fetch { .. }));
    }

    #[test]
    fn test_invalid_header_is_config_error() {
        let mut config = FetchConfig::default();
        config.headers.insert("bad header".to_string(), "v".to_string());

        assert!(matches!(
            HttpFetcher::new(&config),
            Err(ScrapeError::InvalidConfigValueError { .. })
        ));
    }
}
