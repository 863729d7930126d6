use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, EntityName, EntityTrait, Schema};
use tracing::info;

use crate::db::entities::{login_ip, node};

async fn create_table_if_missing<E>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let table = entity.table_name().to_owned();
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(backend.build(&statement)).await?;
    info!(table = %table, "Ensured table exists.");
    Ok(())
}

/// Creates the tables this panel core owns. The `users` table belongs to the
/// account subsystem and is never created here.
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table_if_missing(db, node::Entity).await?;
    create_table_if_missing(db, login_ip::Entity).await?;
    Ok(())
}
