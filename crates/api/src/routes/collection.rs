//! Staff editing of pages with an item collection.
//!
//! One router per item schema, mounted under `/admin/{page}/sessions`.

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
use shelter_pages_core::form::FormValues;
use shelter_pages_core::items::{Animal, Campaign, NewsItem};
use shelter_pages_core::session::EditSession;
use shelter_pages_render::{build_page, render_edit_form, Card};
use uuid::Uuid;

use super::images::{serve_preview, upload_from_request, UploadQuery};
use super::SAVE_SUCCESS;
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AdminClaims;
use crate::state::{AppState, SessionRegistry};

/// Shown whenever a collection save fails, whatever the cause.
pub const SAVE_FAILURE: &str =
    "Falha ao salvar as alterações. Verifique o console para mais detalhes.";

/// An item schema with a staff editor.
pub trait Editable: Card {
    fn sessions(state: &AppState) -> &SessionRegistry<EditSession<Self>>;
}

impl Editable for Animal {
    fn sessions(state: &AppState) -> &SessionRegistry<EditSession<Self>> {
        state.animal_sessions()
    }
}

impl Editable for Campaign {
    fn sessions(state: &AppState) -> &SessionRegistry<EditSession<Self>> {
        state.campaign_sessions()
    }
}

impl Editable for NewsItem {
    fn sessions(state: &AppState) -> &SessionRegistry<EditSession<Self>> {
        state.news_sessions()
    }
}

fn base_path<S: Editable>() -> String {
    format!("/admin/{}/sessions", S::PAGE)
}

pub fn routes<S: Editable>() -> Router<AppState> {
    let base = base_path::<S>();
    Router::new()
        .route(&base, post(open_session::<S>))
        .route(&format!("{base}/{{id}}"), get(form::<S>).delete(discard::<S>))
        .route(&format!("{base}/{{id}}/content"), put(set_content::<S>))
        .route(&format!("{base}/{{id}}/items"), post(add_item::<S>))
        .route(
            &format!("{base}/{{id}}/items/{{key}}"),
            put(apply_item::<S>).delete(remove_item::<S>),
        )
        .route(
            &format!("{base}/{{id}}/items/{{key}}/image"),
            put(upload_image::<S>).get(preview_image::<S>),
        )
        .route(&format!("{base}/{{id}}/submit"), post(submit::<S>))
}

async fn open_session<S: Editable>(
    State(state): State<AppState>,
    _admin: AdminClaims,
) -> (StatusCode, Json<Value>) {
    let editor = state.editor::<S>();
    let snapshot = editor.load().await;
    let list_unavailable = snapshot.listing.is_unavailable();
    let id = S::sessions(&state).open(editor.open(&snapshot)).await;

    tracing::info!(page = %S::PAGE, session = %id, list_unavailable, "edit session opened");
    (
        StatusCode::CREATED,
        Json(json!({ "sessionId": id, "listUnavailable": list_unavailable })),
    )
}

async fn form<S: Editable>(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(id): Path<Uuid>,
) -> ApiResult<Html<String>> {
    let handle = S::sessions(&state).get(id).await?;
    let session = handle.lock().await;
    let title = format!("Editar: {}", session.content().title);
    Ok(Html(build_page(&title, &render_edit_form(&*session))))
}

#[derive(Deserialize)]
struct ContentRequest {
    #[serde(default)]
    title: String,
    #[serde(default)]
    subtitle: String,
}

async fn set_content<S: Editable>(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(id): Path<Uuid>,
    Json(req): Json<ContentRequest>,
) -> ApiResult<StatusCode> {
    let handle = S::sessions(&state).get(id).await?;
    handle.lock().await.set_content(req.title, req.subtitle)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_item<S: Editable>(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let handle = S::sessions(&state).get(id).await?;
    let key = handle.lock().await.add_new()?;
    Ok((StatusCode::CREATED, Json(json!({ "key": key }))))
}

async fn apply_item<S: Editable>(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path((id, key)): Path<(Uuid, String)>,
    Json(values): Json<FormValues>,
) -> ApiResult<StatusCode> {
    let handle = S::sessions(&state).get(id).await?;
    handle.lock().await.apply_form(&key, &values)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct RemoveQuery {
    #[serde(default)]
    confirm: bool,
}

async fn remove_item<S: Editable>(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path((id, key)): Path<(Uuid, String)>,
    Query(query): Query<RemoveQuery>,
) -> ApiResult<Json<Value>> {
    let handle = S::sessions(&state).get(id).await?;
    let removed = handle.lock().await.remove(&key, query.confirm)?;
    if !removed {
        return Ok(Json(json!({ "removed": false, "confirm": S::REMOVE_PROMPT })));
    }
    Ok(Json(json!({ "removed": true })))
}

async fn upload_image<S: Editable>(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path((id, key)): Path<(Uuid, String)>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let handle = S::sessions(&state).get(id).await?;
    let upload = upload_from_request(query, &headers, body);
    let preview = format!("{}/{id}/items/{key}/image", base_path::<S>());
    handle.lock().await.choose_image(&key, upload, preview)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn preview_image<S: Editable>(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path((id, key)): Path<(Uuid, String)>,
) -> ApiResult<Response> {
    let handle = S::sessions(&state).get(id).await?;
    let session = handle.lock().await;
    let entry = session
        .entry(&key)
        .ok_or_else(|| ApiError::NotFound(format!("fragment {key}")))?;
    serve_preview(entry.pending_upload(), entry.record.image())
}

/// Validate and save the session.
///
/// The store calls run in a task of their own with the session unlocked and
/// in `Saving`. The task settles the session whether or not the client is
/// still waiting, so a dropped request neither cuts the batch short nor
/// leaves the session stuck.
async fn submit<S: Editable>(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let handle = S::sessions(&state).get(id).await?;
    let plan = handle.lock().await.begin_save()?;

    let task = tokio::spawn({
        let state = state.clone();
        let handle = handle.clone();
        async move {
            let outcome = state.editor::<S>().execute(plan).await;
            let saved = outcome.is_ok();
            handle.lock().await.finish_save(saved);
            match outcome {
                Ok(snapshot) => tracing::info!(
                    page = %S::PAGE,
                    session = %id,
                    items = snapshot.listing.items().len(),
                    "edit session saved"
                ),
                Err(e) => {
                    tracing::error!(page = %S::PAGE, session = %id, error = %e, "edit session save failed")
                }
            }
            if saved {
                S::sessions(&state).close(id).await;
            }
            saved
        }
    });

    match task.await {
        Ok(true) => Ok(Json(json!({ "message": SAVE_SUCCESS }))),
        Ok(false) => Err(ApiError::SaveFailed(SAVE_FAILURE)),
        Err(e) => {
            handle.lock().await.finish_save(false);
            tracing::error!(page = %S::PAGE, session = %id, error = %e, "save task aborted");
            Err(ApiError::SaveFailed(SAVE_FAILURE))
        }
    }
}

async fn discard<S: Editable>(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !S::sessions(&state).close(id).await {
        return Err(ApiError::NotFound(format!("edit session {id}")));
    }
    tracing::info!(page = %S::PAGE, session = %id, "edit session discarded");
    Ok(StatusCode::NO_CONTENT)
}
