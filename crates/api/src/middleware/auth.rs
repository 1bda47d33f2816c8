use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use shelter_pages_core::auth::Claims;

use crate::error::ApiError;
use crate::state::AppState;

/// Verified staff token. Extract this in handlers that require auth.
#[derive(Debug, Clone)]
pub struct AdminClaims(pub Claims);

impl FromRequestParts<AppState> for AdminClaims {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Unauthorized)?;

        let claims = state.tokens().verify(bearer.token()).map_err(|e| {
            tracing::warn!(error = %e, "rejected staff token");
            ApiError::Unauthorized
        })?;
        Ok(AdminClaims(claims))
    }
}
