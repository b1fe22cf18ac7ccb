//! Plain HTTP transport driver
//!
//! This module handles the HTTP requests of the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests for webpages and other web resources
//! - Classifying failures into unsuccessful responses and transport errors

use crate::client::{is_webpage, Content, FetchResult, Response, WebClient, WebResource};
use crate::config::UserAgentConfig;
use crate::{ConfigError, CrawlError, Result};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Formats the user agent announced by the crawler
///
/// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn format_user_agent(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sumi_crawl::config::UserAgentConfig;
/// use sumi_crawl::client::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "SumiCrawl".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> std::result::Result<Client, reqwest::Error> {
    client_builder(Some(format_user_agent(config))).build()
}

fn client_builder(user_agent: Option<String>) -> reqwest::ClientBuilder {
    let builder = Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .gzip(true)
        .brotli(true);
    match user_agent {
        Some(agent) => builder.user_agent(agent),
        None => builder,
    }
}

/// Gets static webpages and web resources over HTTP
pub struct HttpClient {
    client: Client,
    user_agent: Option<String>,
    closed: AtomicBool,
}

impl HttpClient {
    /// Creates a client announcing the given user agent, or reqwest's default when `None`
    pub fn new(user_agent: Option<String>) -> Result<Self> {
        let client = client_builder(user_agent.clone())
            .build()
            .map_err(|source| {
                ConfigError::Validation(format!("failed to build HTTP client: {}", source))
            })?;
        Ok(Self::with_client(client, user_agent))
    }

    /// Creates a client identified by the configured crawler name and contact details
    pub fn from_config(config: &UserAgentConfig) -> Result<Self> {
        Self::new(Some(format_user_agent(config)))
    }

    /// Wraps an already configured reqwest client
    ///
    /// `user_agent` should be the agent the client sends, as reqwest does not expose it.
    pub fn with_client(client: Client, user_agent: Option<String>) -> Self {
        Self {
            client,
            user_agent,
            closed: AtomicBool::new(false),
        }
    }

    /// Returns the underlying reqwest client
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn read_resource(url: &str, response: reqwest::Response) -> Result<WebResource> {
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(mime_essence)
            .unwrap_or_default();

        let transport = |source| CrawlError::Transport {
            url: url.to_string(),
            source,
        };
        let content = if is_webpage(&content_type) {
            Content::Text(response.text().await.map_err(transport)?)
        } else {
            Content::Binary(response.bytes().await.map_err(transport)?.to_vec())
        };

        Ok(WebResource::new(content_type, content))
    }
}

/// Strips parameters such as `charset` from a Content-Type header value
fn mime_essence(header: &str) -> String {
    header
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

#[async_trait]
impl WebClient for HttpClient {
    async fn fetch(&self, url: &str) -> Result<Response> {
        if self.is_closed() {
            return Err(CrawlError::Task(format!("client closed before fetching {url}")));
        }

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(source) => {
                tracing::error!("Request to {} failed: {}", url, source);
                return Err(CrawlError::Transport {
                    url: url.to_string(),
                    source,
                });
            }
        };

        let fetch_result = FetchResult::new("GET", url, response.status().as_u16());
        if !response.status().is_success() {
            tracing::warn!("{}", fetch_result);
            return Ok(Response::new(fetch_result, None));
        }

        tracing::info!("{}", fetch_result);
        match Self::read_resource(url, response).await {
            Ok(resource) => Ok(Response::new(fetch_result, Some(resource))),
            Err(e) => {
                tracing::error!("{}", e);
                Err(e)
            }
        }
    }

    async fn user_agent(&self) -> Option<String> {
        self.user_agent.clone()
    }

    async fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!("HTTP client closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }

    #[test]
    fn test_build_http_client() {
        let config = create_test_config();
        let client = build_http_client(&config);
        assert!(client.is_ok());
    }

    #[test]
    fn test_user_agent_format() {
        let config = create_test_config();
        assert_eq!(
            format_user_agent(&config),
            "TestCrawler/1.0 (+https://example.com/about; admin@example.com)"
        );
    }

    #[test]
    fn test_mime_essence() {
        assert_eq!(mime_essence("text/html; charset=utf-8"), "text/html");
        assert_eq!(mime_essence("Application/PDF"), "application/pdf");
        assert_eq!(mime_essence(""), "");
    }

    #[tokio::test]
    async fn test_user_agent_reported() {
        let client = HttpClient::from_config(&create_test_config()).unwrap();
        assert_eq!(
            client.user_agent().await.as_deref(),
            Some("TestCrawler/1.0 (+https://example.com/about; admin@example.com)")
        );
        assert!(HttpClient::new(None).unwrap().user_agent().await.is_none());
    }

    #[test]
    fn test_invalid_user_agent_is_a_config_error() {
        let result = HttpClient::new(Some("Bad\nAgent".to_string()));
        assert!(matches!(
            result,
            Err(CrawlError::Config(ConfigError::Validation(_)))
        ));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let client = HttpClient::new(None).unwrap();
        client.close().await.unwrap();
        client.close().await.unwrap();
        assert!(client.is_closed());
        assert!(client.fetch("http://127.0.0.1:9/").await.is_err());
    }

    // Fetch behavior against a live server is covered with wiremock in tests/
}
