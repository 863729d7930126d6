use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::notifications::ChannelConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML from config file at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("{0} is required")]
    Missing(&'static str),
}

/// Immutable panel configuration, loaded once at startup and shared by reference.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    pub database_url: String,
    pub listen_addr: String,
    pub log_dir: String,
    pub app_name: String,
    pub dns: DnsConfig,
    pub notifications: NotificationConfig,
    pub login: LoginLogConfig,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DnsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub base_domain: String,
    pub api_token: Option<String>,
    pub zone_id: Option<String>,
    #[serde(default)]
    pub proxied: bool,
}

/// Toggle and message template for one node event. The template may contain
/// `%node_name%`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct EventNotification {
    #[serde(default)]
    pub enabled: bool,
    pub template: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationConfig {
    pub channel: Option<ChannelConfig>,
    #[serde(default)]
    pub node_added: EventNotification,
    #[serde(default)]
    pub node_updated: EventNotification,
    #[serde(default)]
    pub node_deleted: EventNotification,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoginLogConfig {
    #[serde(default)]
    pub log_enabled: bool,
    #[serde(default)]
    pub notify_new_login: bool,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialPanelConfig {
    database_url: Option<String>,
    listen_addr: Option<String>,
    log_dir: Option<String>,
    app_name: Option<String>,
    #[serde(default)]
    dns: DnsConfig,
    #[serde(default)]
    notifications: NotificationConfig,
    #[serde(default)]
    login: LoginLogConfig,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_app_name() -> String {
    "Relay Panel".to_string()
}

impl PanelConfig {
    /// Loads `.env`, then the optional TOML file, then lets environment variables
    /// override the file.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::load_with(config_path, |key| env::var(key).ok())
    }

    pub fn load_with<F>(config_path: Option<&str>, env_var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 1. Load from file (optional)
        let file_config = match config_path.map(Path::new) {
            Some(path) if path.exists() => {
                let display = path.display().to_string();
                let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: display.clone(),
                    source,
                })?;
                toml::from_str::<PartialPanelConfig>(&contents)
                    .map_err(|source| ConfigError::Parse { path: display, source })?
            }
            _ => PartialPanelConfig::default(),
        };

        // 2. Merge: environment overrides file
        let mut dns = file_config.dns;
        if let Some(token) = env_var("CLOUDFLARE_API_TOKEN") {
            dns.api_token = Some(token);
        }
        if let Some(zone) = env_var("CLOUDFLARE_ZONE_ID") {
            dns.zone_id = Some(zone);
        }

        let mut notifications = file_config.notifications;
        if let (Some(bot_token), Some(chat_id)) = (env_var("TELEGRAM_BOT_TOKEN"), env_var("TELEGRAM_CHAT_ID")) {
            notifications.channel = Some(ChannelConfig::Telegram { bot_token, chat_id });
        }

        let config = PanelConfig {
            database_url: env_var("DATABASE_URL")
                .or(file_config.database_url)
                .ok_or(ConfigError::Missing("DATABASE_URL"))?,
            listen_addr: env_var("LISTEN_ADDR")
                .or(file_config.listen_addr)
                .unwrap_or_else(default_listen_addr),
            log_dir: env_var("LOG_DIR")
                .or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
            app_name: env_var("APP_NAME")
                .or(file_config.app_name)
                .unwrap_or_else(default_app_name),
            dns,
            notifications,
            login: file_config.login,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.dns.enabled {
            if self.dns.base_domain.trim().is_empty() {
                return Err(ConfigError::Missing("dns.base_domain"));
            }
            if self.dns.api_token.is_none() {
                return Err(ConfigError::Missing("dns.api_token"));
            }
            if self.dns.zone_id.is_none() {
                return Err(ConfigError::Missing("dns.zone_id"));
            }
        }

        let n = &self.notifications;
        let wants_channel = n.node_added.enabled
            || n.node_updated.enabled
            || n.node_deleted.enabled
            || self.login.notify_new_login;
        if wants_channel && n.channel.is_none() {
            return Err(ConfigError::Missing("notifications.channel"));
        }
        Ok(())
    }
}
