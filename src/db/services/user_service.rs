use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::db::entities::user;
use crate::db::repository::{RepositoryError, UserContactDirectory};

#[derive(Clone)]
pub struct SeaOrmUserDirectory {
    db: DatabaseConnection,
}

impl SeaOrmUserDirectory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserContactDirectory for SeaOrmUserDirectory {
    async fn telegram_chat_id(&self, user_id: i32) -> Result<Option<i64>, RepositoryError> {
        let user = user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::NotFound(user_id))?;
        Ok(user.telegram_id)
    }
}
