//! Pagewatch - web page change monitor
//!
//! Polls a single URL, detects content changes (or the disappearance of a
//! text fragment), and sends an email alert.

pub mod config;
pub mod detector;
pub mod email;
pub mod error;
pub mod fetcher;
pub mod io;
pub mod logging;
pub mod monitor;
pub mod notifier;
pub mod state;
pub mod webdriver;

pub use config::{find_config, load_config, Config, DetectionMode};
pub use error::{PagewatchError, Result};
pub use monitor::ChangeMonitor;

use std::sync::Arc;

use crate::email::SmtpNotifier;
use crate::fetcher::{HttpPageSource, PageSource};
use crate::io::ReqwestHttpClient;
use crate::notifier::Notifier;
use crate::webdriver::WebDriverPageSource;

/// Open the page source the configured mode needs
///
/// Text-presence mode renders through WebDriver when `WEBDRIVER_URL` is set;
/// everything else reads the raw HTTP response.
pub async fn build_page_source(config: &Config) -> Result<Arc<dyn PageSource>> {
    match (&config.mode, &config.fetch.webdriver_url) {
        (DetectionMode::TextPresence { .. }, Some(endpoint)) => {
            Ok(Arc::new(WebDriverPageSource::connect(endpoint).await?))
        }
        (mode, _) => {
            if matches!(mode, DetectionMode::TextPresence { .. }) {
                tracing::warn!(
                    "WEBDRIVER_URL not set; searching the raw HTTP response without running page scripts"
                );
            }
            let http = ReqwestHttpClient::new(config.fetch.timeout)?;
            Ok(Arc::new(HttpPageSource::new(Arc::new(http))))
        }
    }
}

/// Run the monitor until it finishes or fails
///
/// Returns `Ok(())` only when text-presence mode has sent its alert. The page
/// source is released on every exit path.
pub async fn run(config: Config) -> Result<()> {
    let notifier: Arc<dyn Notifier> = Arc::new(SmtpNotifier::from_config(&config.email)?);
    let source = build_page_source(&config).await?;

    let result = ChangeMonitor::new(&config, Arc::clone(&source), notifier)
        .run()
        .await;

    if let Err(e) = source.release().await {
        tracing::warn!("Failed to release page source: {}", e);
    }

    result
}
