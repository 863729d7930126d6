use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use super::models::ChannelConfig;

pub mod telegram;
pub mod webhook;

#[derive(Error, Debug)]
pub enum SenderError {
    #[error("Channel rejected the message: {0}")]
    SendFailed(String),
    #[error("Channel is misconfigured: {0}")]
    InvalidConfiguration(String),
    #[error("Could not reach the channel: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Could not render the message body: {0}")]
    TemplatingError(String),
}

/// Delivers one message over one channel type.
#[async_trait]
pub trait NotificationSender {
    /// `context` carries the structured fields of the event (`title`, `user_id`, ...)
    /// for channels that render their own payload.
    async fn send(
        &self,
        config: &ChannelConfig,
        message: &str,
        context: &HashMap<String, String>,
    ) -> Result<(), SenderError>;
}
