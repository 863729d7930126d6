use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::enums::LoginOutcome;
use crate::nodes::{MutationOutcome, MutationResponse};
use crate::web::AppState;

/// Login attempt reported by the authentication layer.
#[derive(Deserialize)]
pub struct LoginEventRequest {
    ip: String,
    outcome: LoginOutcome,
    #[serde(default)]
    user_id: i32,
}

#[derive(Serialize)]
pub struct LoginEventResponse {
    /// `false` when login logging is switched off.
    recorded: bool,
    #[serde(flatten)]
    result: MutationResponse,
}

async fn record_login_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<LoginEventRequest>,
) -> Json<LoginEventResponse> {
    let recorded = app_state
        .login_recorder
        .record(&payload.ip, payload.outcome, payload.user_id)
        .await;
    Json(LoginEventResponse {
        recorded: recorded.is_some(),
        result: recorded.unwrap_or_else(MutationOutcome::succeeded).into(),
    })
}

pub fn create_login_router() -> Router<Arc<AppState>> {
    Router::new().route("/login-events", post(record_login_handler))
}
