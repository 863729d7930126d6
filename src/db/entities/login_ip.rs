use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::enums::LoginOutcome;

/// One login attempt against the user panel. Rows are append-only.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "login_ip")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub ip: String,
    #[sea_orm(column_name = "userid")]
    pub user_id: i32, // 0 when the attempt could not be tied to an account
    pub datetime: i64, // Seconds since the Unix epoch
    #[sea_orm(column_name = "type")]
    pub outcome: LoginOutcome,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
