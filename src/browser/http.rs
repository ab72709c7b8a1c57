//! HTTP-backed browser
//!
//! This module loads pages with a reqwest client, including:
//! - Building the client with an identifying user agent string
//! - Spacing navigations by a minimum delay
//! - Classifying non-success responses

use crate::browser::{Browser, Document};
use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::{HarvestError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `timeout` - Total time allowed for one request
///
/// # Example
///
/// ```no_run
/// use car_harvest::browser::build_http_client;
/// use car_harvest::config::UserAgentConfig;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "CarHarvest".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// A [`Browser`] that fetches static HTML over HTTP
pub struct HttpBrowser {
    client: Client,
    request_delay: Duration,
    last_request: Option<Instant>,
    document: Option<Document>,
}

impl HttpBrowser {
    /// Creates a browser from the user agent and crawler settings
    pub fn new(user_agent: &UserAgentConfig, crawler: &CrawlerConfig) -> Result<Self> {
        let client = build_http_client(user_agent, Duration::from_secs(crawler.request_timeout))?;
        Ok(Self::with_client(
            client,
            Duration::from_millis(crawler.request_delay),
        ))
    }

    /// Creates a browser around an existing client
    pub fn with_client(client: Client, request_delay: Duration) -> Self {
        Self {
            client,
            request_delay,
            last_request: None,
            document: None,
        }
    }

    async fn wait_for_slot(&self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.request_delay {
                sleep(self.request_delay - elapsed).await;
            }
        }
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn load(&mut self, url: &str) -> Result<()> {
        self.wait_for_slot().await;
        self.document = None;

        tracing::debug!("GET {}", url);
        let sent = self.client.get(url).send().await;
        self.last_request = Some(Instant::now());

        let response = sent.map_err(|source| HarvestError::Http {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|source| HarvestError::Http {
            url: url.to_string(),
            source,
        })?;

        self.document = Some(Document::new(final_url, body));
        Ok(())
    }

    fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }
}
