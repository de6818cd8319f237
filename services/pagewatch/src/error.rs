//! Error types for the pagewatch service

/// Errors that can occur in the pagewatch service
///
/// Every variant is fatal: the binary logs it and exits with status 1.
#[derive(Debug, thiserror::Error)]
pub enum PagewatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Detection failed: {0}")]
    Detect(String),

    #[error("Notification failed: {0}")]
    Notify(String),
}

impl PagewatchError {
    /// Short category name used in the fatal log line
    pub fn category(&self) -> &'static str {
        match self {
            PagewatchError::Config(_) => "ConfigError",
            PagewatchError::Fetch(_) => "FetchError",
            PagewatchError::Detect(_) => "DetectError",
            PagewatchError::Notify(_) => "NotifyError",
        }
    }
}

/// Render an error followed by every `source()` beneath it as `outer: inner: root`
///
/// Causes whose text already appears in the message are skipped.
pub fn chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Result type alias for pagewatch operations
pub type Result<T> = std::result::Result<T, PagewatchError>;
