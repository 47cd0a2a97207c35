//! Outbound mail
//!
//! [`MailTransport`] is the seam to the mail provider. The server ships an
//! HTTP relay transport, a logging transport for environments without a relay,
//! and a recording transport for tests.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

use crate::core::config::MailConfig;

/// Text attachment (receipts)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail relay unreachable: {0}")]
    Transport(String),

    #[error("Mail relay rejected message: {status} - {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}

/// Posts messages as JSON to an HTTPS mail relay
pub struct HttpRelayTransport {
    client: reqwest::Client,
    endpoint: String,
    username: Option<String>,
    password: Option<String>,
    from: String,
}

impl HttpRelayTransport {
    pub fn new(host: &str, config: &MailConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            endpoint: format!("https://{}:{}/send", host, config.port),
            username: config.username.clone(),
            password: config.password.clone(),
            from: config.from.clone(),
        }
    }
}

#[async_trait]
impl MailTransport for HttpRelayTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        let mut request = self.client.post(&self.endpoint).json(&json!({
            "from": self.from,
            "to": message.to,
            "subject": message.subject,
            "text": message.body,
            "attachments": message.attachments,
        }));
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }

        let resp = request
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(MailError::Rejected { status, body });
        }
        Ok(())
    }
}

/// Writes messages to the log instead of sending them
#[derive(Debug, Default)]
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            attachments = message.attachments.len(),
            "Mail relay not configured, message logged only"
        );
        tracing::debug!(body = %message.body, "Logged mail body");
        Ok(())
    }
}

/// Keeps every message in memory; can be switched to fail
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<MailMessage>>,
    fail: Mutex<bool>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn set_failing(&self, fail: bool) {
        if let Ok(mut flag) = self.fail.lock() {
            *flag = fail;
        }
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        if self.fail.lock().map(|f| *f).unwrap_or(false) {
            return Err(MailError::Transport("simulated outage".into()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message.clone());
        }
        Ok(())
    }
}

/// Transport for the configured relay, or the logging transport
pub fn transport_from_config(config: &MailConfig) -> std::sync::Arc<dyn MailTransport> {
    match &config.host {
        Some(host) => {
            tracing::info!(host = %host, "Mail relay configured");
            std::sync::Arc::new(HttpRelayTransport::new(host, config))
        }
        None => {
            tracing::warn!("MAIL_HOST not set, outgoing mail will only be logged");
            std::sync::Arc::new(LogTransport)
        }
    }
}
