use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::models::ChannelConfig;
use super::senders::{
    telegram::TelegramSender, webhook::WebhookSender, NotificationSender, SenderError,
};
use crate::db::repository::{RepositoryError, UserContactDirectory};

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Sender error: {0}")]
    SenderError(#[from] SenderError),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
    #[error("No notification channel is configured")]
    NoChannel,
    #[error("User {0} has no reachable notification address")]
    UserUnreachable(i32),
}

/// Best-effort alert delivery used after successful writes.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Message for the panel operators.
    async fn notify_admin(&self, message: &str) -> Result<(), NotificationError>;

    /// Message for one panel user.
    async fn notify_user(&self, user_id: i32, title: &str, body: &str) -> Result<(), NotificationError>;
}

/// [`Notifier`] delivering over the single channel configured for the panel.
pub struct NotificationService {
    channel: Option<ChannelConfig>,
    users: Arc<dyn UserContactDirectory>,
    telegram: TelegramSender,
    webhook: WebhookSender,
}

impl NotificationService {
    pub fn new(channel: Option<ChannelConfig>, users: Arc<dyn UserContactDirectory>) -> Self {
        Self {
            channel,
            users,
            telegram: TelegramSender::new(),
            webhook: WebhookSender::new(),
        }
    }

    async fn dispatch(
        &self,
        config: &ChannelConfig,
        message: &str,
        context: &HashMap<String, String>,
    ) -> Result<(), NotificationError> {
        match config {
            ChannelConfig::Telegram { .. } => self.telegram.send(config, message, context).await?,
            ChannelConfig::Webhook { .. } => self.webhook.send(config, message, context).await?,
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for NotificationService {
    async fn notify_admin(&self, message: &str) -> Result<(), NotificationError> {
        let channel = self.channel.as_ref().ok_or(NotificationError::NoChannel)?;
        let context = HashMap::from([("audience".to_string(), "admin".to_string())]);
        self.dispatch(channel, message, &context).await?;
        debug!("Operator notification delivered.");
        Ok(())
    }

    async fn notify_user(&self, user_id: i32, title: &str, body: &str) -> Result<(), NotificationError> {
        let channel = self.channel.as_ref().ok_or(NotificationError::NoChannel)?;
        let target = match channel {
            ChannelConfig::Telegram { .. } => {
                let chat_id = self
                    .users
                    .telegram_chat_id(user_id)
                    .await?
                    .ok_or(NotificationError::UserUnreachable(user_id))?;
                channel.for_chat(chat_id)
            }
            ChannelConfig::Webhook { .. } => channel.clone(),
        };
        let context = HashMap::from([
            ("audience".to_string(), "user".to_string()),
            ("user_id".to_string(), user_id.to_string()),
            ("title".to_string(), title.to_string()),
        ]);
        self.dispatch(&target, body, &context).await?;
        debug!(user_id, "User notification delivered.");
        Ok(())
    }
}
