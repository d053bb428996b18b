use std::fmt::Debug;

use async_trait::async_trait;
use eyre::{eyre, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("All fields are required")]
    MissingFields,
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Failed to send message")]
    Delivery(eyre::Report),
}

impl ContactMessage {
    pub fn validate(&self) -> Result<(), ContactError> {
        let fields = [&self.name, &self.email, &self.message];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(ContactError::MissingFields);
        }
        match self.email.trim().split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(ContactError::InvalidEmail),
        }
    }
}

/// Hands contact form submissions to whatever actually delivers mail.
#[async_trait]
pub trait Mailer: Debug + Send + Sync {
    async fn send(&self, message: &ContactMessage) -> Result<()>;
}

/// Only logs messages. Used when no mail service is configured.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &ContactMessage) -> Result<()> {
        info!(
            name = %message.name,
            email = %message.email,
            "contact message received: {}",
            message.message
        );
        Ok(())
    }
}

/// POSTs the message as JSON to an external mail-sending service.
#[derive(Debug, Clone)]
pub struct WebhookMailer {
    client: reqwest::Client,
    url: String,
}

impl WebhookMailer {
    pub fn new(url: String) -> WebhookMailer {
        WebhookMailer {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl Mailer for WebhookMailer {
    #[tracing::instrument(skip(self, message), fields(url = %self.url))]
    async fn send(&self, message: &ContactMessage) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(message)
            .send()
            .await
            .wrap_err("error calling mail service")?;
        let status = response.status();
        if !status.is_success() {
            return Err(eyre!("mail service responded with {}", status));
        }
        Ok(())
    }
}

/// Validate and send a contact form submission.
pub async fn submit(mailer: &dyn Mailer, message: &ContactMessage) -> Result<(), ContactError> {
    message.validate()?;
    mailer.send(message).await.map_err(ContactError::Delivery)
}
