use axum::{
    extract::{Path, State},
    response::Html,
    routing::get,
    Router,
};
use shelter_pages_core::document::DocPath;
use shelter_pages_core::items::{Animal, Campaign, NewsItem};
use shelter_pages_core::{DocumentStore, PageName};
use shelter_pages_render::{render_animal_detail, render_homepage, render_page};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Public, read-only pages.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(homepage))
        .route("/pages/{page}", get(page))
        .route("/pages/adocao/items/{id}", get(animal_detail))
}

async fn homepage(State(state): State<AppState>) -> Html<String> {
    let doc = state.homepage_editor().load().await;
    Html(render_homepage(doc.as_ref()))
}

async fn page(State(state): State<AppState>, Path(page): Path<String>) -> ApiResult<Html<String>> {
    let page: PageName = page
        .parse()
        .map_err(|e: shelter_pages_core::page::UnknownPage| ApiError::NotFound(e.to_string()))?;

    let html = match page {
        PageName::Adocao => render_page(&state.editor::<Animal>().load().await),
        PageName::Campanhas => render_page(&state.editor::<Campaign>().load().await),
        PageName::Trabalhos => render_page(&state.editor::<NewsItem>().load().await),
        PageName::PaginaInicial => render_homepage(state.homepage_editor().load().await.as_ref()),
    };
    Ok(Html(html))
}

/// Detail fragment opened from an animal card.
async fn animal_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Html<String>> {
    let not_found = || ApiError::NotFound(format!("animal {id}"));
    if id.is_empty() || id.contains('/') {
        return Err(not_found());
    }

    let doc = state
        .store()
        .get(&DocPath::item(PageName::Adocao, &id))
        .await?
        .ok_or_else(not_found)?;
    let animal: Animal = serde_json::from_value(serde_json::Value::Object(doc.data))
        .map_err(|e| ApiError::Internal(format!("animal {id} does not decode: {e}")))?;
    Ok(Html(render_animal_detail(&animal)))
}
