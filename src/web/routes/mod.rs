pub mod login_routes;
pub mod node_routes;
