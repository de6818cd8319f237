//! Page sources: where the monitor gets page content from

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::PagewatchError;
use crate::io::HttpClient;

/// A loaded page whose content can be read once it has settled
///
/// Loading and reading are separate so the monitor can wait for client-side
/// rendering between the two.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait PageSource: Send + Sync {
    /// Navigate to `url`
    async fn load(&self, url: &str) -> crate::Result<()>;

    /// Content of the most recently loaded page
    async fn read(&self) -> crate::Result<Vec<u8>>;

    /// Release any session held by the source
    async fn release(&self) -> crate::Result<()>;
}

/// Plain HTTP GET; the body is the raw transport response
pub struct HttpPageSource {
    http: Arc<dyn HttpClient>,
    last_body: Mutex<Option<Vec<u8>>>,
}

impl HttpPageSource {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            last_body: Mutex::new(None),
        }
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn load(&self, url: &str) -> crate::Result<()> {
        let response = self.http.get(url).await?;
        if !response.is_success() {
            return Err(PagewatchError::Fetch(format!(
                "GET {} returned status {}",
                url, response.status
            )));
        }
        *self.last_body.lock().await = Some(response.body);
        Ok(())
    }

    async fn read(&self) -> crate::Result<Vec<u8>> {
        self.last_body
            .lock()
            .await
            .take()
            .ok_or_else(|| PagewatchError::Fetch("No page has been loaded".to_string()))
    }

    async fn release(&self) -> crate::Result<()> {
        self.last_body.lock().await.take();
        Ok(())
    }
}
