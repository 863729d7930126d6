use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, DatabaseConnection, DbErr, EntityTrait, Set};
use tracing::debug;

use crate::db::entities::node;
use crate::db::repository::{NodeRepository, RepositoryError};

/// Node storage backed by the `nodes` table.
#[derive(Clone)]
pub struct SeaOrmNodeRepository {
    db: DatabaseConnection,
}

impl SeaOrmNodeRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_active_model(node: node::Model) -> node::ActiveModel {
    node::ActiveModel {
        id: Set(node.id),
        name: Set(node.name),
        info: Set(node.info),
        sort: Set(node.sort),
        node_class: Set(node.node_class),
        node_group: Set(node.node_group),
        server: Set(node.server),
        node_ip: Set(node.node_ip),
        password: Set(node.password),
        traffic_rate: Set(node.traffic_rate),
        is_dynamic_rate: Set(node.is_dynamic_rate),
        dynamic_rate_config: Set(node.dynamic_rate_config),
        node_bandwidth: Set(node.node_bandwidth),
        node_bandwidth_limit: Set(node.node_bandwidth_limit),
        bandwidthlimit_resetday: Set(node.bandwidthlimit_resetday),
        node_speedlimit: Set(node.node_speedlimit),
        custom_config: Set(node.custom_config),
        is_enabled: Set(node.is_enabled),
    }
}

#[async_trait]
impl NodeRepository for SeaOrmNodeRepository {
    async fn find(&self, id: i32) -> Result<Option<node::Model>, RepositoryError> {
        Ok(node::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn insert(&self, node: node::Model) -> Result<node::Model, RepositoryError> {
        let mut active_node = to_active_model(node);
        active_node.id = NotSet;
        let created = active_node.insert(&self.db).await?;
        debug!(node_id = created.id, "Inserted node row.");
        Ok(created)
    }

    async fn update(&self, node: node::Model) -> Result<node::Model, RepositoryError> {
        let id = node.id;
        to_active_model(node)
            .update(&self.db)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => RepositoryError::NotFound(id),
                other => RepositoryError::Database(other),
            })
    }

    async fn delete(&self, id: i32) -> Result<bool, RepositoryError> {
        let result = node::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
