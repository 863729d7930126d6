use axum::{http::Method, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::login::LoginAnomalyRecorder;
use crate::nodes::NodeMutationService;
use crate::web::routes::*;

pub mod error;
pub mod routes;

pub use error::AppError;

pub struct AppState {
    pub node_service: Arc<NodeMutationService>,
    pub login_recorder: Arc<LoginAnomalyRecorder>,
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_axum_router(
    node_service: Arc<NodeMutationService>,
    login_recorder: Arc<LoginAnomalyRecorder>,
) -> Router {
    let app_state = Arc::new(AppState {
        node_service,
        login_recorder,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check_handler))
        .nest("/api/admin/nodes", node_routes::create_node_router())
        .nest("/api/internal", login_routes::create_login_router())
        .with_state(app_state)
        .layer(cors)
}
