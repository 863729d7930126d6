use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where operator and user notifications are delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChannelConfig {
    Telegram {
        bot_token: String,
        /// Operator chat receiving node events.
        chat_id: String,
    },
    Webhook {
        url: String,
        #[serde(default = "default_webhook_method")]
        method: String, // "GET" or "POST"
        #[serde(default)]
        headers: Option<HashMap<String, String>>,
        /// Tera template for the POST body. Defaults to a JSON document with the
        /// event fields.
        #[serde(default)]
        body_template: Option<String>,
    },
}

fn default_webhook_method() -> String {
    "POST".to_string()
}

impl ChannelConfig {
    /// Same channel, redirected to another Telegram chat. Webhooks are unchanged
    /// since the recipient travels in the message context instead.
    pub fn for_chat(&self, chat_id: i64) -> Self {
        match self {
            ChannelConfig::Telegram { bot_token, .. } => ChannelConfig::Telegram {
                bot_token: bot_token.clone(),
                chat_id: chat_id.to_string(),
            },
            other => other.clone(),
        }
    }
}
