//! Notifier trait for sending alerts

use async_trait::async_trait;

/// A notification to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

impl Notification {
    /// The alert sent when the watched page changes
    pub fn page_changed(url: &str) -> Self {
        let line = format!("{} has changed", url);
        Self {
            subject: line.clone(),
            body: line,
        }
    }
}

/// Trait for sending notifications
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Get the notifier type name (e.g. "email")
    fn type_name(&self) -> &str;

    /// Send a notification
    async fn notify(&self, notification: &Notification) -> crate::Result<()>;
}
