//! Upload intake and preview serving shared by every edit form.

use axum::{
    body::Bytes,
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use shelter_pages_core::image::{ImageUpload, InlineImage};

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadQuery {
    #[serde(default)]
    pub file_name: String,
}

/// Build an upload from a raw request body and its declared content type.
///
/// The bytes are not checked here; a bad file fails the save that encodes it.
pub fn upload_from_request(query: UploadQuery, headers: &HeaderMap, body: Bytes) -> ImageUpload {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let file_name = if query.file_name.is_empty() {
        "upload".to_string()
    } else {
        query.file_name
    };
    ImageUpload::new(file_name, content_type, body.to_vec())
}

/// Serve what an image preview shows: the pending upload, the decoded inline
/// image, or a redirect to the stored URL.
pub fn serve_preview(pending: Option<&ImageUpload>, current: &str) -> ApiResult<Response> {
    if let Some(upload) = pending {
        return Ok(([(header::CONTENT_TYPE, upload.mime())], upload.bytes.clone()).into_response());
    }
    if InlineImage::is_inline(current) {
        let image = InlineImage::parse(current)
            .map_err(|e| ApiError::Internal(format!("stored inline image is corrupt: {e}")))?;
        return Ok(([(header::CONTENT_TYPE, image.mime)], image.bytes).into_response());
    }
    if current.trim().is_empty() {
        return Err(ApiError::NotFound("no image".into()));
    }
    Ok(Redirect::temporary(current).into_response())
}
