use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

use crate::db::entities::login_ip;
use crate::db::repository::{LoginIpRepository, NewLoginRecord, RepositoryError};

#[derive(Clone)]
pub struct SeaOrmLoginIpRepository {
    db: DatabaseConnection,
}

impl SeaOrmLoginIpRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LoginIpRepository for SeaOrmLoginIpRepository {
    async fn has_login(&self, user_id: i32, ip: &str) -> Result<bool, RepositoryError> {
        let count = login_ip::Entity::find()
            .filter(login_ip::Column::UserId.eq(user_id))
            .filter(login_ip::Column::Ip.eq(ip))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn append(&self, record: NewLoginRecord) -> Result<login_ip::Model, RepositoryError> {
        let active_record = login_ip::ActiveModel {
            ip: Set(record.ip),
            user_id: Set(record.user_id),
            datetime: Set(record.datetime),
            outcome: Set(record.outcome),
            ..Default::default()
        };
        Ok(active_record.insert(&self.db).await?)
    }
}
