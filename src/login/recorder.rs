use chrono::{DateTime, Local, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::db::enums::LoginOutcome;
use crate::db::repository::{LoginIpRepository, NewLoginRecord};
use crate::nodes::outcome::{Degradation, MutationOutcome};
use crate::notifications::Notifier;
use crate::server::config::LoginLogConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AlertCheck {
    FirstFromIp,
    /// History could not be read, so a possibly owed alert was not sent.
    Unknown,
}

/// Appends login attempts to the log and tells a user when their account signs in
/// successfully from an address with no earlier attempt of any outcome.
pub struct LoginAnomalyRecorder {
    logins: Arc<dyn LoginIpRepository>,
    notifier: Arc<dyn Notifier>,
    settings: LoginLogConfig,
    app_name: String,
}

impl LoginAnomalyRecorder {
    pub fn new(
        logins: Arc<dyn LoginIpRepository>,
        notifier: Arc<dyn Notifier>,
        settings: LoginLogConfig,
        app_name: impl Into<String>,
    ) -> Self {
        Self {
            logins,
            notifier,
            settings,
            app_name: app_name.into(),
        }
    }

    /// Returns `None` when login logging is switched off and nothing was recorded.
    /// `user_id` is `0` for attempts that could not be tied to an account.
    pub async fn record(&self, ip: &str, outcome: LoginOutcome, user_id: i32) -> Option<MutationOutcome> {
        if !self.settings.log_enabled {
            return None;
        }
        Some(self.record_at(ip, outcome, user_id, Utc::now()).await)
    }

    async fn record_at(
        &self,
        ip: &str,
        outcome: LoginOutcome,
        user_id: i32,
        at: DateTime<Utc>,
    ) -> MutationOutcome {
        let wants_alert =
            self.settings.notify_new_login && user_id != 0 && outcome == LoginOutcome::Success;

        // Checked before appending so the current attempt does not count as prior.
        // A failed lookup only costs the alert, never the record.
        let alert = if wants_alert {
            match self.logins.has_login(user_id, ip).await {
                Ok(seen) => (!seen).then_some(AlertCheck::FirstFromIp),
                Err(e) => {
                    warn!(user_id, ip, error = %e, "Failed to look up login history, skipping new login check.");
                    Some(AlertCheck::Unknown)
                }
            }
        } else {
            None
        };

        let record = NewLoginRecord {
            ip: ip.to_string(),
            user_id,
            datetime: at.timestamp(),
            outcome,
        };
        if let Err(e) = self.logins.append(record).await {
            error!(user_id, ip, error = %e, "Failed to record login attempt.");
            return MutationOutcome::failed();
        }
        debug!(user_id, ip, %outcome, "Login attempt recorded.");

        match alert {
            None => return MutationOutcome::succeeded(),
            Some(AlertCheck::Unknown) => {
                return MutationOutcome::succeeded().degrade(Degradation::Notify);
            }
            Some(AlertCheck::FirstFromIp) => {}
        }

        let title = format!("{} - new login", self.app_name);
        let body = new_login_message(ip, at);
        match self.notifier.notify_user(user_id, &title, &body).await {
            Ok(()) => {
                info!(user_id, ip, "New login address notification sent.");
                MutationOutcome::succeeded()
            }
            Err(e) => {
                warn!(user_id, ip, error = %e, "Login recorded but the new login notification failed.");
                MutationOutcome::succeeded().degrade(Degradation::Notify)
            }
        }
    }
}

fn new_login_message(ip: &str, at: DateTime<Utc>) -> String {
    format!(
        "Your account signed in to the user panel at {} from {ip}",
        at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
    )
}
