//! Staff editing of the homepage document.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use shelter_pages_core::homepage::{FooterFields, HomepageImage, HomepageSession, MAX_SLOTS};
use shelter_pages_render::{build_page, render_homepage_form};
use uuid::Uuid;

use super::images::{serve_preview, upload_from_request, UploadQuery};
use super::SAVE_SUCCESS;
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AdminClaims;
use crate::state::AppState;

/// Shown whenever a homepage save fails, whatever the cause.
pub const SAVE_FAILURE: &str =
    "Ocorreu um erro ao salvar as alterações. Verifique o console para mais detalhes.";

const BASE: &str = "/admin/paginaInicial/sessions";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(BASE, post(open_session))
        .route(&format!("{BASE}/{{id}}"), get(form).delete(discard))
        .route(&format!("{BASE}/{{id}}/buttons/{{slot}}"), put(set_button))
        .route(&format!("{BASE}/{{id}}/footer"), put(set_footer))
        .route(&format!("{BASE}/{{id}}/supplies"), put(set_supplies))
        .route(
            &format!("{BASE}/{{id}}/images/{{target}}"),
            put(upload_image).get(preview_image),
        )
        .route(&format!("{BASE}/{{id}}/submit"), post(submit))
}

fn image_target(raw: &str) -> ApiResult<HomepageImage> {
    HomepageImage::parse(raw).ok_or_else(|| ApiError::NotFound(format!("image slot {raw}")))
}

async fn open_session(State(state): State<AppState>, _admin: AdminClaims) -> (StatusCode, Json<Value>) {
    let doc = state.homepage_editor().load().await;
    let id = state
        .homepage_sessions()
        .open(HomepageSession::open(doc.as_ref()))
        .await;
    tracing::info!(session = %id, "homepage edit session opened");
    (StatusCode::CREATED, Json(json!({ "sessionId": id })))
}

async fn form(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(id): Path<Uuid>,
) -> ApiResult<Html<String>> {
    let handle = state.homepage_sessions().get(id).await?;
    let session = handle.lock().await;
    Ok(Html(build_page("Editar: Página Inicial", &render_homepage_form(&*session))))
}

#[derive(Deserialize)]
struct ButtonRequest {
    #[serde(default)]
    title: String,
    #[serde(default)]
    subtitle: String,
    #[serde(default)]
    link: String,
}

/// `slot` is 1-based, as in the form.
async fn set_button(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path((id, slot)): Path<(Uuid, usize)>,
    Json(req): Json<ButtonRequest>,
) -> ApiResult<StatusCode> {
    if !(1..=MAX_SLOTS).contains(&slot) {
        return Err(ApiError::NotFound(format!("button {slot}")));
    }
    let handle = state.homepage_sessions().get(id).await?;
    handle
        .lock()
        .await
        .set_button(slot - 1, req.title, req.subtitle, req.link)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_footer(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(id): Path<Uuid>,
    Json(footer): Json<FooterFields>,
) -> ApiResult<StatusCode> {
    let handle = state.homepage_sessions().get(id).await?;
    handle.lock().await.set_footer(footer)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct SuppliesRequest {
    /// Textarea contents, one supply per line.
    #[serde(default)]
    text: String,
}

async fn set_supplies(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(id): Path<Uuid>,
    Json(req): Json<SuppliesRequest>,
) -> ApiResult<StatusCode> {
    let handle = state.homepage_sessions().get(id).await?;
    handle.lock().await.set_supplies(req.text)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn upload_image(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path((id, target)): Path<(Uuid, String)>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let slot = image_target(&target)?;
    let handle = state.homepage_sessions().get(id).await?;
    let upload = upload_from_request(query, &headers, body);
    let preview = format!("{BASE}/{id}/images/{target}");
    handle.lock().await.choose_image(slot, upload, preview)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn preview_image(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path((id, target)): Path<(Uuid, String)>,
) -> ApiResult<Response> {
    let slot = image_target(&target)?;
    let handle = state.homepage_sessions().get(id).await?;
    let session = handle.lock().await;
    let image = session
        .image_slot(slot)
        .ok_or_else(|| ApiError::NotFound(format!("image slot {target}")))?;
    serve_preview(image.pending_upload(), &image.current)
}

/// Same flow as the collection editors: the save runs in its own task and
/// settles the session even if the client goes away.
async fn submit(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let handle = state.homepage_sessions().get(id).await?;
    let plan = handle.lock().await.begin_save()?;

    let task = tokio::spawn({
        let state = state.clone();
        let handle = handle.clone();
        async move {
            let outcome = state.homepage_editor().execute(plan).await;
            let saved = outcome.is_ok();
            handle.lock().await.finish_save(saved);
            match outcome {
                Ok(_) => tracing::info!(session = %id, "homepage saved"),
                Err(e) => tracing::error!(session = %id, error = %e, "homepage save failed"),
            }
            if saved {
                state.homepage_sessions().close(id).await;
            }
            saved
        }
    });

    match task.await {
        Ok(true) => Ok(Json(json!({ "message": SAVE_SUCCESS }))),
        Ok(false) => Err(ApiError::SaveFailed(SAVE_FAILURE)),
        Err(e) => {
            handle.lock().await.finish_save(false);
            tracing::error!(session = %id, error = %e, "homepage save task aborted");
            Err(ApiError::SaveFailed(SAVE_FAILURE))
        }
    }
}

async fn discard(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !state.homepage_sessions().close(id).await {
        return Err(ApiError::NotFound(format!("edit session {id}")));
    }
    tracing::info!(session = %id, "homepage edit session discarded");
    Ok(StatusCode::NO_CONTENT)
}
