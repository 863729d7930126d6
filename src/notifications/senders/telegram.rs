use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::collections::HashMap;

use super::{NotificationSender, SenderError};
use crate::notifications::models::ChannelConfig;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Pushes plain-text messages through the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramSender {
    client: Client,
}

impl Default for TelegramSender {
    fn default() -> Self {
        Self::new()
    }
}

impl TelegramSender {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[derive(Serialize, Debug, PartialEq)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: String,
    disable_web_page_preview: bool,
}

// Titled messages put the title on its own first line.
fn message_text(message: &str, context: &HashMap<String, String>) -> String {
    match context.get("title") {
        Some(title) if !title.is_empty() => format!("{title}\n\n{message}"),
        _ => message.to_string(),
    }
}

#[async_trait]
impl NotificationSender for TelegramSender {
    async fn send(
        &self,
        config: &ChannelConfig,
        message: &str,
        context: &HashMap<String, String>,
    ) -> Result<(), SenderError> {
        let ChannelConfig::Telegram { bot_token, chat_id } = config else {
            return Err(SenderError::InvalidConfiguration(
                "Expected Telegram config, but found a different type.".to_string(),
            ));
        };

        let api_url = format!("{TELEGRAM_API_BASE}/bot{bot_token}/sendMessage");
        let payload = SendMessage {
            chat_id,
            text: message_text(message, context),
            disable_web_page_preview: true,
        };

        let response = self.client.post(&api_url).json(&payload).send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(SenderError::SendFailed(format!(
                "Telegram API returned non-success status: {status}. Body: {error_body}"
            )));
        }

        Ok(())
    }
}
