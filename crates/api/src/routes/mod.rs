pub mod auth;
pub mod collection;
pub mod health;
pub mod homepage;
pub mod images;
pub mod pages;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use shelter_pages_core::items::{Animal, Campaign, NewsItem};
use tower_http::limit::RequestBodyLimitLayer;

use crate::state::AppState;

/// Shown after any successful save.
pub const SAVE_SUCCESS: &str = "Alterações salvas com sucesso!";

/// Assemble the full router with all route groups.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config().max_upload_bytes;
    Router::new()
        .merge(health::routes())
        .merge(pages::routes())
        .merge(auth::routes())
        .merge(collection::routes::<Animal>())
        .merge(collection::routes::<Campaign>())
        .merge(collection::routes::<NewsItem>())
        .merge(homepage::routes())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}
