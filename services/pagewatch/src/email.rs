//! Email notifier over SMTP

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::EmailConfig;
use crate::error::{chain, PagewatchError};
use crate::notifier::{Notification, Notifier};

/// Delivery of a fully built message
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: Message) -> crate::Result<()>;
}

/// Message submission port that upgrades a plain connection with STARTTLS
const SUBMISSION_PORT: u16 = 587;

/// Whether `port` expects STARTTLS rather than implicit TLS
fn uses_starttls(port: u16) -> bool {
    port == SUBMISSION_PORT
}

/// SMTP submission over TLS; one connection per message
///
/// Port 587 negotiates STARTTLS, every other port uses implicit TLS.
pub struct SmtpTransport {
    host: String,
    port: u16,
    credentials: Credentials,
}

impl SmtpTransport {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            credentials: Credentials::new(config.username.clone(), config.password.clone()),
        }
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, message: Message) -> crate::Result<()> {
        tracing::debug!("Connecting to SMTP server {}:{}", self.host, self.port);
        let relay = if uses_starttls(self.port) {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
        };
        let transport = relay
            .map_err(|e| {
                PagewatchError::Notify(format!("SMTP relay {}: {}", self.host, chain(&e)))
            })?
            .port(self.port)
            .credentials(self.credentials.clone())
            .build();

        let response = transport.send(message).await.map_err(|e| {
            PagewatchError::Notify(format!(
                "SMTP send via {}:{} failed: {}",
                self.host,
                self.port,
                chain(&e)
            ))
        })?;

        tracing::debug!("SMTP server accepted message: {:?}", response.code());
        Ok(())
    }
}

/// Sends change alerts as plain-text email
pub struct SmtpNotifier {
    sender: Mailbox,
    recipients: Vec<Mailbox>,
    transport: Arc<dyn MailTransport>,
}

impl std::fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpNotifier")
            .field("sender", &self.sender.to_string())
            .field("recipients", &self.recipients.len())
            .finish()
    }
}

impl SmtpNotifier {
    pub fn new(config: &EmailConfig, transport: Arc<dyn MailTransport>) -> crate::Result<Self> {
        let sender = parse_mailbox(&config.username, "EMAIL_USERNAME")?;
        let recipients = config
            .recipients
            .iter()
            .map(|address| parse_mailbox(address, "RECIPIENT_ADDRESS"))
            .collect::<crate::Result<Vec<_>>>()?;

        tracing::debug!(
            "Created SmtpNotifier from {} to {} recipient(s)",
            sender,
            recipients.len()
        );

        Ok(Self {
            sender,
            recipients,
            transport,
        })
    }

    /// Build a notifier that delivers through the configured SMTP server
    pub fn from_config(config: &EmailConfig) -> crate::Result<Self> {
        Self::new(config, Arc::new(SmtpTransport::new(config)))
    }

    fn build_message(&self, notification: &Notification) -> crate::Result<Message> {
        let mut builder = Message::builder()
            .from(self.sender.clone())
            .subject(notification.subject.clone())
            .header(ContentType::TEXT_PLAIN);
        for recipient in &self.recipients {
            builder = builder.to(recipient.clone());
        }
        builder
            .body(notification.body.clone())
            .map_err(|e| {
                PagewatchError::Notify(format!("Building message: {}", chain(&e)))
            })
    }
}

fn parse_mailbox(address: &str, key: &str) -> crate::Result<Mailbox> {
    address.parse::<Mailbox>().map_err(|e| {
        PagewatchError::Config(format!("{} {:?} is not a valid address: {}", key, address, e))
    })
}

#[async_trait]
impl Notifier for SmtpNotifier {
    fn type_name(&self) -> &str {
        "email"
    }

    async fn notify(&self, notification: &Notification) -> crate::Result<()> {
        let message = self.build_message(notification)?;

        tracing::debug!(
            "Sending email to {} recipient(s): '{}'",
            self.recipients.len(),
            notification.subject
        );

        if let Err(e) = self.transport.send(message).await {
            tracing::error!("unable to send: {}", notification.body);
            return Err(e);
        }

        tracing::info!("{}", notification.body);
        Ok(())
    }
}
