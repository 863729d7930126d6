use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;

use crate::nodes::{MutationResponse, NodeEditView, NodeForm};
use crate::web::{AppError, AppState};

async fn create_node_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<NodeForm>,
) -> Result<Json<MutationResponse>, AppError> {
    let outcome = app_state.node_service.create(&payload).await?;
    Ok(Json(outcome.into()))
}

async fn edit_node_handler(
    State(app_state): State<Arc<AppState>>,
    Path(node_id): Path<i32>,
) -> Result<Json<NodeEditView>, AppError> {
    app_state
        .node_service
        .load_for_edit(node_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Node {node_id} not found")))
}

async fn update_node_handler(
    State(app_state): State<Arc<AppState>>,
    Path(node_id): Path<i32>,
    Json(payload): Json<NodeForm>,
) -> Result<Json<MutationResponse>, AppError> {
    let outcome = app_state.node_service.update(node_id, &payload).await?;
    Ok(Json(outcome.into()))
}

async fn delete_node_handler(
    State(app_state): State<Arc<AppState>>,
    Path(node_id): Path<i32>,
) -> Json<MutationResponse> {
    Json(app_state.node_service.delete(node_id).await.into())
}

async fn reset_credential_handler(
    State(app_state): State<Arc<AppState>>,
    Path(node_id): Path<i32>,
) -> Json<MutationResponse> {
    Json(app_state.node_service.reset_credential(node_id).await.into())
}

async fn copy_node_handler(
    State(app_state): State<Arc<AppState>>,
    Path(node_id): Path<i32>,
) -> Json<MutationResponse> {
    Json(app_state.node_service.replicate(node_id).await.into())
}

pub fn create_node_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_node_handler))
        .route(
            "/{id}",
            put(update_node_handler).delete(delete_node_handler),
        )
        .route("/{id}/edit", get(edit_node_handler))
        .route("/{id}/reset", post(reset_credential_handler))
        .route("/{id}/copy", post(copy_node_handler))
}
