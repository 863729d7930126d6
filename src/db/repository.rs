//! Persistence ports used by the node and login services.
//!
//! The services only talk to storage through these traits so they can be driven
//! by the sea-orm implementations in [`crate::db::services`] in production and by
//! in-memory fakes in tests.

use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;

use crate::db::entities::{login_ip, node};
use crate::db::enums::LoginOutcome;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    #[error("Record not found: {0}")]
    NotFound(i32),
}

#[async_trait]
pub trait NodeRepository: Send + Sync {
    async fn find(&self, id: i32) -> Result<Option<node::Model>, RepositoryError>;

    /// Persists `node` under a fresh identity. The `id` of the argument is ignored.
    async fn insert(&self, node: node::Model) -> Result<node::Model, RepositoryError>;

    /// Overwrites every column of an existing row. Last write wins.
    async fn update(&self, node: node::Model) -> Result<node::Model, RepositoryError>;

    /// Removes the row. Returns `false` when nothing was deleted.
    async fn delete(&self, id: i32) -> Result<bool, RepositoryError>;
}

/// Login attempt to be appended to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoginRecord {
    pub ip: String,
    pub user_id: i32,
    pub datetime: i64,
    pub outcome: LoginOutcome,
}

#[async_trait]
pub trait LoginIpRepository: Send + Sync {
    /// Whether any attempt, successful or not, was logged for `user_id` from `ip`.
    async fn has_login(&self, user_id: i32, ip: &str) -> Result<bool, RepositoryError>;

    async fn append(&self, record: NewLoginRecord) -> Result<login_ip::Model, RepositoryError>;
}

#[async_trait]
pub trait UserContactDirectory: Send + Sync {
    /// Telegram chat the user linked to their account, if any.
    async fn telegram_chat_id(&self, user_id: i32) -> Result<Option<i64>, RepositoryError>;
}
