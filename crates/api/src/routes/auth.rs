use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use shelter_pages_core::auth::{verify_password, TOKEN_TTL_HOURS};

use crate::error::ApiResult;
use crate::state::AppState;

const STAFF_SUBJECT: &str = "staff";

pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/login", post(login))
}

#[derive(Deserialize)]
struct LoginRequest {
    password: String,
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<Value>> {
    if let Err(e) = verify_password(&req.password, state.config().admin_password_hash.as_deref()) {
        tracing::warn!(error = %e, "staff login refused");
        return Err(e.into());
    }

    let token = state.tokens().issue(STAFF_SUBJECT)?;
    tracing::info!("staff login");
    Ok(Json(json!({
        "token": token,
        "expiresIn": TOKEN_TTL_HOURS * 3600,
    })))
}
