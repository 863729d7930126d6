use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::repository::RepositoryError;
use crate::nodes::NodeServiceError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Address resolution failed: {0}")]
    AddressUnresolvable(String),
    #[error("DNS sync failed for node {node_id}: {message}")]
    DnsSyncFailed { node_id: i32, message: String },
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "ok": false, "error": msg })),
            AppError::AddressUnresolvable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "ok": false, "error": format!("Address resolution failed: {msg}") }),
            ),
            // The node row exists at this point, so the caller gets its id back.
            AppError::DnsSyncFailed { node_id, message } => (
                StatusCode::BAD_GATEWAY,
                json!({ "ok": false, "id": node_id, "error": format!("DNS sync failed: {message}") }),
            ),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "ok": false, "error": format!("Database error: {msg}") }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

impl From<NodeServiceError> for AppError {
    fn from(err: NodeServiceError) -> Self {
        match err {
            NodeServiceError::AddressResolution(e) => AppError::AddressUnresolvable(e.to_string()),
            NodeServiceError::DnsSync { node_id, source } => AppError::DnsSyncFailed {
                node_id,
                message: source.to_string(),
            },
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => AppError::NotFound(format!("Node {id} not found")),
            RepositoryError::Database(e) => AppError::DatabaseError(e.to_string()),
        }
    }
}
