use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::api::response::{ApiError, AppPath};
use crate::auth::Caller;
use crate::cover_store::{content_type_for, CoverStoreError};
use crate::AppState;

/// Serve a book's cover image.
/// Route: GET /cover/:id (book id)
///
/// Open mode falls back to the default image whenever there is nothing to serve.
/// Identified callers get 404 instead, including for books they cannot see.
pub async fn get_cover(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    AppPath(id): AppPath<u64>,
) -> Result<Response, ApiError> {
    let book = state
        .db
        .get_book(id)
        .map_err(|e| ApiError::internal("Failed to load book", e))?;

    let cover_id = match &caller {
        Caller::Anonymous => book.and_then(|b| b.cover_id),
        Caller::User(_) => {
            let cover_id = book
                .filter(|b| caller.can_read(b))
                .and_then(|b| b.cover_id)
                .ok_or_else(|| ApiError::not_found("Cover not found"))?;
            Some(cover_id)
        }
    };

    let Some(cover_id) = cover_id else {
        return serve_default_cover(&state).await;
    };

    match state.cover_store.get(&cover_id).await {
        Ok(data) => Ok(image_response(data, &content_type_for(&cover_id))),
        Err(CoverStoreError::NotFound(_)) => match caller {
            Caller::Anonymous => serve_default_cover(&state).await,
            Caller::User(_) => Err(ApiError::not_found("Cover not found")),
        },
        Err(e) => Err(ApiError::internal("Failed to read cover", e)),
    }
}

async fn serve_default_cover(state: &AppState) -> Result<Response, ApiError> {
    let path = &state.config.storage.default_cover;
    let file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Default cover is missing");
            return Err(ApiError::not_found("Cover not found"));
        }
        Err(e) => return Err(ApiError::internal("Failed to open default cover", e)),
    };

    let mut response = Body::from_stream(ReaderStream::new(file)).into_response();
    let headers = response.headers_mut();
    set_content_type(headers, &content_type_for(path));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    Ok(response)
}

fn image_response(data: Bytes, content_type: &str) -> Response {
    let mut response = (StatusCode::OK, data).into_response();
    let headers = response.headers_mut();
    set_content_type(headers, content_type);

    // Covers are immutable once uploaded
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=3600"),
    );
    response
}

fn set_content_type(headers: &mut axum::http::HeaderMap, content_type: &str) {
    headers.insert(
        header::CONTENT_TYPE,
        content_type
            .parse()
            .unwrap_or(HeaderValue::from_static("image/jpeg")),
    );
}
