//! Configuration types for the pagewatch service
//!
//! The file format uses flat upper-case keys (`CHECK_URL`, `EMAIL_USERNAME`, ...).
//! [`RawConfig`] mirrors the file as-is;
//! [`Config::from_raw`] validates it once into the immutable [`Config`] that
//! the rest of the service works with.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::PagewatchError;

/// Directories searched for a configuration file, in priority order
pub const CONFIG_DIRS: &[&str] = &["./configs/", "/configs/", "/run/secrets/"];

/// File names accepted inside each of [`CONFIG_DIRS`]
pub const CONFIG_NAMES: &[&str] = &["config.json", "website-change-checker-config.json"];

const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 465;

/// A seconds value that may be written as a JSON number or a numeric string
///
/// Anything else is kept as-is so validation can report it against its key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Seconds {
    Integer(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl Seconds {
    fn parse(&self, key: &str) -> crate::Result<i64> {
        let invalid = || PagewatchError::Config(format!("{} must be an integer, got {}", key, self));
        match self {
            Seconds::Integer(n) => Ok(*n),
            Seconds::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(*f as i64),
            Seconds::Text(s) => s.trim().parse::<i64>().map_err(|_| invalid()),
            Seconds::Float(_) | Seconds::Other(_) => Err(invalid()),
        }
    }
}

impl fmt::Display for Seconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seconds::Integer(n) => write!(f, "{}", n),
            Seconds::Float(x) => write!(f, "{}", x),
            Seconds::Text(s) => write!(f, "{:?}", s),
            Seconds::Other(value) => write!(f, "{}", value),
        }
    }
}

/// One recipient address or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    fn into_vec(self) -> Vec<String> {
        match self {
            Recipients::One(address) => vec![address],
            Recipients::Many(addresses) => addresses,
        }
    }
}

/// The configuration file exactly as written on disk
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RawConfig {
    pub check_url: Option<String>,
    pub check_interval_seconds: Option<Seconds>,
    pub email_username: Option<String>,
    pub email_password: Option<String>,
    pub recipient_address: Option<Recipients>,
    pub search_text: Option<String>,
    pub render_delay_seconds: Option<Seconds>,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub fetch_timeout_seconds: Option<Seconds>,
    pub webdriver_url: Option<String>,
}

/// Which comparison strategy the monitor runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionMode {
    /// Alert whenever the digest of the page body changes; runs forever
    Fingerprint,
    /// Alert once when `search_text` disappears from the rendered page, then stop
    TextPresence {
        search_text: String,
        render_delay: Duration,
    },
}

impl DetectionMode {
    pub fn name(&self) -> &'static str {
        match self {
            DetectionMode::Fingerprint => "fingerprint",
            DetectionMode::TextPresence { .. } => "text-presence",
        }
    }
}

/// Sender credentials and recipients for change alerts
#[derive(Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub username: String,
    pub password: String,
    pub recipients: Vec<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("username", &self.username)
            .field("recipients", &self.recipients)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .finish_non_exhaustive()
    }
}

/// How pages are retrieved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchConfig {
    /// Upper bound on one HTTP request; `None` waits as long as the server does
    pub timeout: Option<Duration>,
    /// WebDriver endpoint used to render pages in text-presence mode
    pub webdriver_url: Option<String>,
}

/// Validated, immutable run parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub check_url: String,
    pub check_interval: Duration,
    pub mode: DetectionMode,
    pub email: EmailConfig,
    pub fetch: FetchConfig,
}

impl Config {
    /// Validate a raw configuration, naming the first missing or invalid key
    pub fn from_raw(raw: RawConfig) -> crate::Result<Self> {
        let check_url = required_string(raw.check_url, "CHECK_URL")?;
        reqwest::Url::parse(&check_url).map_err(|e| {
            PagewatchError::Config(format!("CHECK_URL {:?} is not a valid URL: {}", check_url, e))
        })?;

        let interval = raw
            .check_interval_seconds
            .ok_or_else(|| missing("CHECK_INTERVAL_SECONDS"))?
            .parse("CHECK_INTERVAL_SECONDS")?;
        if interval <= 0 {
            return Err(PagewatchError::Config(format!(
                "CHECK_INTERVAL_SECONDS must be greater than 0, got {}",
                interval
            )));
        }

        let username = required_string(raw.email_username, "EMAIL_USERNAME")?;
        let password = required_string(raw.email_password, "EMAIL_PASSWORD")?;

        let recipients: Vec<String> = raw
            .recipient_address
            .ok_or_else(|| missing("RECIPIENT_ADDRESS"))?
            .into_vec()
            .into_iter()
            .map(|address| address.trim().to_string())
            .filter(|address| !address.is_empty())
            .collect();
        if recipients.is_empty() {
            return Err(missing("RECIPIENT_ADDRESS"));
        }

        let mode = match raw.search_text {
            None => DetectionMode::Fingerprint,
            Some(search_text) => {
                if search_text.trim().is_empty() {
                    return Err(PagewatchError::Config(
                        "SEARCH_TEXT must not be empty".to_string(),
                    ));
                }
                let render_delay = match raw.render_delay_seconds {
                    Some(seconds) => non_negative(&seconds, "RENDER_DELAY_SECONDS")?,
                    None => Duration::ZERO,
                };
                DetectionMode::TextPresence {
                    search_text,
                    render_delay,
                }
            }
        };

        let timeout = match raw.fetch_timeout_seconds {
            Some(seconds) => match non_negative(&seconds, "FETCH_TIMEOUT_SECONDS")? {
                d if d.is_zero() => None,
                d => Some(d),
            },
            None => None,
        };

        Ok(Self {
            check_url,
            check_interval: Duration::from_secs(interval as u64),
            mode,
            email: EmailConfig {
                username,
                password,
                recipients,
                smtp_host: raw
                    .smtp_host
                    .filter(|h| !h.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                smtp_port: raw.smtp_port.unwrap_or(DEFAULT_SMTP_PORT),
            },
            fetch: FetchConfig {
                timeout,
                webdriver_url: raw.webdriver_url.filter(|u| !u.trim().is_empty()),
            },
        })
    }
}

fn missing(key: &str) -> PagewatchError {
    PagewatchError::Config(format!("missing required configuration field {}", key))
}

fn required_string(value: Option<String>, key: &str) -> crate::Result<String> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(missing(key)),
    }
}

fn non_negative(seconds: &Seconds, key: &str) -> crate::Result<Duration> {
    let value = seconds.parse(key)?;
    if value < 0 {
        return Err(PagewatchError::Config(format!(
            "{} must not be negative, got {}",
            key, value
        )));
    }
    Ok(Duration::from_secs(value as u64))
}

/// Return the first existing config file under `dirs`, trying [`CONFIG_NAMES`] in order
pub fn find_config_in<P: AsRef<Path>>(dirs: &[P]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| CONFIG_NAMES.iter().map(move |name| dir.as_ref().join(name)))
        .find(|candidate| candidate.is_file())
}

/// Locate the configuration file in the default deployment locations
pub fn find_config() -> crate::Result<PathBuf> {
    find_config_in(CONFIG_DIRS).ok_or_else(|| {
        PagewatchError::Config(format!(
            "missing config.json file, could not find in locations: {}",
            CONFIG_DIRS.join(", ")
        ))
    })
}

/// Load and validate configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        PagewatchError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let raw: RawConfig = serde_json::from_str(&content).map_err(|e| {
        PagewatchError::Config(format!("Failed to parse config file {:?}: {}", path, e))
    })?;
    Config::from_raw(raw)
}
