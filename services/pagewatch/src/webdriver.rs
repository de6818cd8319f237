//! Rendered-page source backed by a WebDriver browser session

use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use serde_json::{json, Map, Value};

use crate::error::{chain, PagewatchError};
use crate::fetcher::PageSource;
use crate::io::BROWSER_USER_AGENT;

/// A headless browser session held for the lifetime of the process
///
/// `read` returns the document after client-side scripts have run, not the
/// initial transport response.
pub struct WebDriverPageSource {
    client: Client,
    endpoint: String,
}

impl std::fmt::Debug for WebDriverPageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDriverPageSource")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

fn headless_capabilities() -> Map<String, Value> {
    let mut capabilities = Map::new();
    capabilities.insert(
        "goog:chromeOptions".to_string(),
        json!({
            "args": [
                "--headless=new",
                "--no-sandbox",
                "--disable-dev-shm-usage",
                format!("--user-agent={}", BROWSER_USER_AGENT),
            ]
        }),
    );
    capabilities
}

impl WebDriverPageSource {
    /// Open a browser session through the WebDriver server at `endpoint`
    pub async fn connect(endpoint: &str) -> crate::Result<Self> {
        tracing::debug!("Opening WebDriver session at {}", endpoint);
        let mut builder = ClientBuilder::native();
        builder.capabilities(headless_capabilities());
        let client = builder.connect(endpoint).await.map_err(|e| {
            PagewatchError::Fetch(format!(
                "WebDriver session at {} failed: {}",
                endpoint,
                chain(&e)
            ))
        })?;
        tracing::info!("Browser session opened at {}", endpoint);

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl PageSource for WebDriverPageSource {
    async fn load(&self, url: &str) -> crate::Result<()> {
        tracing::debug!("Navigating browser to {}", url);
        self.client
            .goto(url)
            .await
            .map_err(|e| {
                PagewatchError::Fetch(format!("Navigating to {} failed: {}", url, chain(&e)))
            })
    }

    async fn read(&self) -> crate::Result<Vec<u8>> {
        let source = self
            .client
            .source()
            .await
            .map_err(|e| {
                PagewatchError::Fetch(format!("Reading page source failed: {}", chain(&e)))
            })?;
        tracing::debug!("Rendered document is {} bytes", source.len());
        Ok(source.into_bytes())
    }

    async fn release(&self) -> crate::Result<()> {
        tracing::debug!("Closing WebDriver session at {}", self.endpoint);
        self.client.clone().close().await.map_err(|e| {
            PagewatchError::Fetch(format!(
                "Closing WebDriver session failed: {}",
                chain(&e)
            ))
        })
    }
}
