use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::enums::NodeSort;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "nodes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub info: String,
    pub sort: NodeSort,
    pub node_class: i32,
    pub node_group: i32,
    pub server: String, // As entered by the operator, may be a hostname
    pub node_ip: String, // Always a literal IPv4/IPv6 address
    pub password: String, // Node communication credential
    pub traffic_rate: f64,
    pub is_dynamic_rate: bool,
    #[sea_orm(column_type = "JsonBinary")]
    pub dynamic_rate_config: Json,
    pub node_bandwidth: i64,       // Bytes consumed in the current cycle
    pub node_bandwidth_limit: i64, // Bytes, 0 means unlimited
    pub bandwidthlimit_resetday: i32,
    pub node_speedlimit: f64,
    #[sea_orm(column_type = "JsonBinary")]
    pub custom_config: Json,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub is_enabled: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
