//! HTTP client for isbn.nu price pages using wreq.

use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Trait for fetching price pages - enables mocking for tests.
#[async_trait]
pub trait PricePageSource: Send + Sync {
    /// Returns the URL of the price page for an ISBN.
    fn page_url(&self, isbn: &str) -> String;

    /// Fetches a page and returns its body.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// isbn.nu HTTP client.
pub struct IsbnClient {
    client: Client,
    base_url: String,
}

impl IsbnClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { client, base_url: config.base_url.trim_end_matches('/').to_string() })
    }
}

#[async_trait]
impl PricePageSource for IsbnClient {
    fn page_url(&self, isbn: &str) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(isbn))
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .with_context(|| format!("Error loading url [{}]", url))?;

        let status = response.status();
        debug!("Response status: {}", status);

        // isbn.nu answers unknown ISBNs with an error page; let the extractors report on it
        if !status.is_success() {
            warn!("Price page [{}] returned status {}", url, status);
        }

        response.text().await.with_context(|| format!("Failed to read response body from [{}]", url))
    }
}
