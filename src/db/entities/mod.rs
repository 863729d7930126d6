//! SeaORM entities for the panel tables.

pub mod login_ip;
pub mod node;
pub mod user;
