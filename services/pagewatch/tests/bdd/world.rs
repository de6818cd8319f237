//! BDD test world for pagewatch

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cucumber::World;
use pagewatch::config::{EmailConfig, FetchConfig};
use pagewatch::fetcher::PageSource;
use pagewatch::io::Sleeper;
use pagewatch::monitor::Step;
use pagewatch::notifier::{Notification, Notifier};
use pagewatch::state::ObservedState;
use pagewatch::{ChangeMonitor, Config, DetectionMode, PagewatchError};

/// Everything the collaborators did, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Load,
    Read,
    Sleep(Duration),
    Notify(String),
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

/// Serves a fixed sequence of page bodies, one per load
#[derive(Debug)]
pub struct ScriptedSource {
    pages: Mutex<VecDeque<Vec<u8>>>,
    current: Mutex<Option<Vec<u8>>>,
    log: EventLog,
}

#[async_trait]
impl PageSource for ScriptedSource {
    async fn load(&self, _url: &str) -> pagewatch::Result<()> {
        self.log.lock().unwrap().push(Event::Load);
        let page = self
            .pages
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| PagewatchError::Fetch("connection refused".to_string()))?;
        *self.current.lock().unwrap() = Some(page);
        Ok(())
    }

    async fn read(&self) -> pagewatch::Result<Vec<u8>> {
        self.log.lock().unwrap().push(Event::Read);
        self.current
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| PagewatchError::Fetch("nothing loaded".to_string()))
    }

    async fn release(&self) -> pagewatch::Result<()> {
        Ok(())
    }
}

/// Records alerts and optionally fails them
#[derive(Debug)]
pub struct RecordingNotifier {
    succeed: bool,
    log: EventLog,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn type_name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, notification: &Notification) -> pagewatch::Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(Event::Notify(notification.body.clone()));
        if self.succeed {
            Ok(())
        } else {
            Err(PagewatchError::Notify("421 service not available".to_string()))
        }
    }
}

/// Records waits without sleeping
#[derive(Debug)]
pub struct RecordingSleeper {
    log: EventLog,
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.log.lock().unwrap().push(Event::Sleep(duration));
    }
}

#[derive(Debug, Default, World)]
pub struct PagewatchWorld {
    // Monitor testing
    pub url: String,
    pub mode: Option<DetectionMode>,
    pub interval_seconds: u64,
    pub pages: Vec<Vec<u8>>,
    pub notifier_fails: bool,
    pub log: EventLog,
    pub monitor: Option<Arc<ChangeMonitor>>,
    pub observed: Option<ObservedState>,
    pub last_step: Option<pagewatch::Result<Step>>,
    pub run_result: Option<pagewatch::Result<()>>,

    // Configuration testing
    pub config_json: Option<serde_json::Map<String, serde_json::Value>>,
    pub config_result: Option<pagewatch::Result<Config>>,
}

impl PagewatchWorld {
    pub fn config(&self) -> Config {
        Config {
            check_url: self.url.clone(),
            check_interval: Duration::from_secs(self.interval_seconds.max(1)),
            mode: self.mode.clone().unwrap_or(DetectionMode::Fingerprint),
            email: EmailConfig {
                username: "watcher@example.com".to_string(),
                password: "secret".to_string(),
                recipients: vec!["me@example.com".to_string()],
                smtp_host: "smtp.example.com".to_string(),
                smtp_port: 465,
            },
            fetch: FetchConfig::default(),
        }
    }

    /// Build the monitor over the scripted page sequence
    pub fn monitor(&mut self) -> Arc<ChangeMonitor> {
        if let Some(monitor) = &self.monitor {
            return Arc::clone(monitor);
        }
        let source = ScriptedSource {
            pages: Mutex::new(self.pages.drain(..).collect()),
            current: Mutex::new(None),
            log: Arc::clone(&self.log),
        };
        let notifier = RecordingNotifier {
            succeed: !self.notifier_fails,
            log: Arc::clone(&self.log),
        };
        let sleeper = RecordingSleeper {
            log: Arc::clone(&self.log),
        };
        let monitor = Arc::new(
            ChangeMonitor::new(&self.config(), Arc::new(source), Arc::new(notifier))
                .with_sleeper(Arc::new(sleeper)),
        );
        self.monitor = Some(Arc::clone(&monitor));
        monitor
    }

    pub fn events(&self) -> Vec<Event> {
        self.log.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Notify(body) => Some(body),
                _ => None,
            })
            .collect()
    }
}
