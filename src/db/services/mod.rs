//! sea-orm implementations of the persistence ports in [`crate::db::repository`].

pub mod login_ip_service;
pub mod node_service;
pub mod schema;
pub mod user_service;

pub use login_ip_service::SeaOrmLoginIpRepository;
pub use node_service::SeaOrmNodeRepository;
pub use schema::ensure_schema;
pub use user_service::SeaOrmUserDirectory;
