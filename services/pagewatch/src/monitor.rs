//! Change monitor: the poll, compare and notify loop

use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, DetectionMode};
use crate::detector::{find_text, fingerprint};
use crate::fetcher::PageSource;
use crate::io::{Sleeper, TokioSleeper};
use crate::notifier::{Notification, Notifier};
use crate::state::{CheckResult, ObservedState};

/// What one pass through the loop body did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Page matched the observed state
    Unchanged,
    /// Change alerted; keep watching
    Alerted,
    /// Change alerted; monitoring is complete
    Finished,
}

/// Watches one page and alerts when it changes
///
/// In fingerprint mode the interval sleep comes before every re-check and the
/// monitor runs until an error. In text-presence mode the first re-check runs
/// immediately, the sleep follows each unchanged check, and the monitor stops
/// after alerting that the search text disappeared.
pub struct ChangeMonitor {
    url: String,
    mode: DetectionMode,
    interval: Duration,
    source: Arc<dyn PageSource>,
    notifier: Arc<dyn Notifier>,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for ChangeMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeMonitor")
            .field("url", &self.url)
            .field("mode", &self.mode)
            .field("interval", &self.interval)
            .finish()
    }
}

impl ChangeMonitor {
    pub fn new(config: &Config, source: Arc<dyn PageSource>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            url: config.check_url.clone(),
            mode: config.mode.clone(),
            interval: config.check_interval,
            source,
            notifier,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the timer used for interval and render-delay waits
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    fn is_text_presence(&self) -> bool {
        matches!(self.mode, DetectionMode::TextPresence { .. })
    }

    async fn fetch(&self) -> crate::Result<Vec<u8>> {
        self.source.load(&self.url).await?;
        if let DetectionMode::TextPresence { render_delay, .. } = &self.mode {
            if !render_delay.is_zero() {
                tracing::debug!("Waiting {:?} for the page to render", render_delay);
                self.sleeper.sleep(*render_delay).await;
            }
        }
        self.source.read().await
    }

    fn observe(&self, content: &[u8]) -> crate::Result<ObservedState> {
        match &self.mode {
            DetectionMode::Fingerprint => Ok(ObservedState::Fingerprint(fingerprint(content))),
            DetectionMode::TextPresence { search_text, .. } => {
                Ok(ObservedState::Presence(find_text(content, search_text)?))
            }
        }
    }

    /// Fetch the page once and record the baseline; never notifies
    pub async fn initialize(&self) -> crate::Result<ObservedState> {
        let content = self.fetch().await?;
        let observed = self.observe(&content)?;

        match (&observed, &self.mode) {
            (ObservedState::Fingerprint(fp), _) => tracing::info!("Initial hash: {}", fp),
            (ObservedState::Presence(true), DetectionMode::TextPresence { search_text, .. }) => {
                tracing::info!("Found {:?} on {}", search_text, self.url)
            }
            (ObservedState::Presence(_), _) => tracing::warn!(
                "Search text not found on the initial check of {}; the next check will alert",
                self.url
            ),
        }
        Ok(observed)
    }

    /// Fetch the page and compare it with `previous`
    pub async fn check(&self, previous: &ObservedState) -> crate::Result<CheckResult> {
        tracing::info!("Checking url {}", self.url);
        let content = self.fetch().await?;
        let observed = self.observe(&content)?;

        let changed = match observed {
            ObservedState::Presence(present) => !present,
            ObservedState::Fingerprint(_) => observed != *previous,
        };

        tracing::debug!(
            "Check of {}: {} bytes, {} (changed={})",
            self.url,
            content.len(),
            observed,
            changed
        );

        Ok(CheckResult {
            content_len: content.len(),
            observed,
            changed,
        })
    }

    /// Run one pass of the loop body
    ///
    /// `observed` is replaced only after the alert was delivered, so a failed
    /// notification leaves the previous baseline in place.
    pub async fn step(&self, observed: &mut ObservedState) -> crate::Result<Step> {
        let text_presence = self.is_text_presence();

        if !text_presence {
            self.sleeper.sleep(self.interval).await;
        }

        let result = self.check(observed).await?;

        if result.changed {
            tracing::info!("Site changed, sending alert");
            tracing::debug!("Notifying via {}", self.notifier.type_name());
            self.notifier
                .notify(&Notification::page_changed(&self.url))
                .await?;
            *observed = result.observed;
            return Ok(if text_presence {
                Step::Finished
            } else {
                Step::Alerted
            });
        }

        tracing::info!(
            "No change, sleeping for {} seconds",
            self.interval.as_secs()
        );
        if text_presence {
            self.sleeper.sleep(self.interval).await;
        }
        Ok(Step::Unchanged)
    }

    /// Initialize, then loop until an error or, in text-presence mode, the alert
    pub async fn run(&self) -> crate::Result<()> {
        tracing::info!(
            "Watching {} in {} mode every {} seconds",
            self.url,
            self.mode.name(),
            self.interval.as_secs()
        );

        let mut observed = self.initialize().await?;
        loop {
            if self.step(&mut observed).await? == Step::Finished {
                tracing::info!("Search text is gone from {}; stopping", self.url);
                return Ok(());
            }
        }
    }
}
