use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::response::{Ack, ApiError, AppJson, AppPath, AppQuery, JSend};
use crate::auth::Caller;
use crate::cover_store::generate_cover_id;
use crate::storage::models::{BookRecord, BookUpdate, InvalidProgress, NewBook, Progress};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub id: u64,
    #[serde(rename = "judul")]
    pub title: String,
    #[serde(rename = "deskripsi")]
    pub description: String,
    pub author: String,
    #[serde(rename = "coverId")]
    pub cover_id: Option<String>,
    #[serde(rename = "progres")]
    pub progress: Progress,
    #[serde(rename = "email", skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
    #[serde(rename = "isPublic")]
    pub is_public: bool,
    #[serde(rename = "isOwner", skip_serializing_if = "Option::is_none")]
    pub is_owner: Option<bool>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedBook {
    pub id: u64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookRequest {
    #[serde(rename = "judul", alias = "title")]
    pub title: String,
    #[serde(rename = "deskripsi", alias = "description")]
    pub description: String,
    pub author: String,
    #[serde(rename = "progres", alias = "progress")]
    pub progress: Progress,
    #[serde(default, rename = "isPublic", alias = "is_public")]
    pub is_public: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListBooksParams {
    #[serde(default, rename = "progres", alias = "progress")]
    pub progress: Option<String>,
}

/// An uploaded cover held in memory until the form has been validated.
struct CoverUpload {
    file_name: Option<String>,
    data: Bytes,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_books(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    AppQuery(params): AppQuery<ListBooksParams>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let progress = params
        .progress
        .as_deref()
        .map(str::parse::<Progress>)
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let books = state
        .db
        .list_books()
        .map_err(|e| ApiError::internal("Failed to list books", e))?;

    let items = books
        .iter()
        .filter(|book| caller.can_read(book))
        .filter(|book| progress.map_or(true, |p| book.progress == p))
        .map(|book| book_to_response(book, &caller))
        .collect();

    Ok(Json(items))
}

pub async fn create_book(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    mut multipart: Multipart,
) -> Result<Json<JSend<CreatedBook>>, ApiError> {
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut author: Option<String> = None;
    let mut progress: Option<String> = None;
    let mut is_public: Option<String> = None;
    let mut cover: Option<CoverUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Invalid multipart data", e))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "cover" => {
                let file_name = field.file_name().map(|s| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("Failed to read cover", e))?;

                if data.len() as u64 > state.config.max_upload_size {
                    return Err(ApiError::payload_too_large(format!(
                        "Cover exceeds maximum upload size of {} bytes",
                        state.config.max_upload_size
                    )));
                }

                // Browsers send an empty part when no file was picked
                if !data.is_empty() {
                    cover = Some(CoverUpload { file_name, data });
                }
            }
            "judul" | "title" => title = Some(field_text(field, "judul").await?),
            "deskripsi" | "description" => {
                description = Some(field_text(field, "deskripsi").await?)
            }
            "author" => author = Some(field_text(field, "author").await?),
            "progres" | "progress" => progress = Some(field_text(field, "progres").await?),
            "isPublic" | "is_public" => is_public = Some(field_text(field, "isPublic").await?),
            _ => {
                // Ignore unknown fields
            }
        }
    }

    let title = required(title, "judul")?;
    if title.trim().is_empty() {
        return Err(ApiError::bad_request("judul must not be empty"));
    }
    let description = required(description, "deskripsi")?;
    let author = required(author, "author")?;
    let progress: Progress = required(progress, "progres")?
        .parse()
        .map_err(|e: InvalidProgress| ApiError::bad_request(e.to_string()))?;
    let is_public = match is_public.as_deref() {
        Some(raw) => parse_flag(raw).ok_or_else(|| {
            ApiError::bad_request(format!("isPublic must be a boolean, got '{raw}'"))
        })?,
        None => false,
    };

    // Phase 1: write the cover so the row never references a missing file
    let cover_id = match cover {
        Some(upload) => {
            let key = generate_cover_id(upload.file_name.as_deref());
            state
                .cover_store
                .put(&key, upload.data)
                .await
                .map_err(|e| ApiError::internal("Failed to store cover", e))?;
            Some(key)
        }
        None => None,
    };

    // Phase 2: insert the row
    let new_book = NewBook {
        title,
        description,
        author,
        progress,
        cover_id: cover_id.clone(),
        owner_email: caller.owner_email(),
        is_public,
    };

    let record = match state.db.insert_book(new_book) {
        Ok(record) => record,
        Err(e) => {
            // Best-effort cleanup of the uploaded cover
            if let Some(ref key) = cover_id {
                let _ = state.cover_store.delete(key).await;
            }
            return Err(ApiError::internal("Failed to insert book", e));
        }
    };

    tracing::debug!(book_id = record.id, cover_id = ?record.cover_id, "Created book");

    Ok(JSend::success(CreatedBook { id: record.id }))
}

pub async fn update_book(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    AppPath(id): AppPath<u64>,
    AppJson(req): AppJson<UpdateBookRequest>,
) -> Result<Json<JSend<Ack>>, ApiError> {
    load_for_modification(&state, &caller, id)?;

    let update = BookUpdate {
        title: req.title,
        description: req.description,
        author: req.author,
        progress: req.progress,
        is_public: req.is_public,
    };

    let matched = state
        .db
        .update_book(id, &update)
        .map_err(|e| ApiError::internal("Failed to update book", e))?;

    if matched {
        tracing::debug!(book_id = id, "Updated book");
    } else {
        tracing::debug!(book_id = id, "Update matched no book");
    }

    Ok(JSend::ok())
}

pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    AppPath(id): AppPath<u64>,
) -> Result<Json<JSend<Ack>>, ApiError> {
    let book = load_for_modification(&state, &caller, id)?;

    // Phase 1: remove the cover file (best-effort)
    if let Some(cover_id) = book.as_ref().and_then(|b| b.cover_id.as_deref()) {
        if let Err(e) = state.cover_store.delete(cover_id).await {
            tracing::warn!(book_id = id, cover_id = %cover_id, error = %e, "Failed to delete cover");
        }
    }

    // Phase 2: remove the row
    let deleted = state
        .db
        .delete_book(id)
        .map_err(|e| ApiError::internal("Failed to delete book", e))?;

    if deleted {
        tracing::debug!(book_id = id, "Deleted book");
    } else {
        tracing::debug!(book_id = id, "Delete matched no book");
    }

    Ok(JSend::ok())
}

// ============================================================================
// Helpers
// ============================================================================

/// Load a book and check the caller may change it.
/// Identified callers get 403 for both a foreign and a missing book.
fn load_for_modification(
    state: &AppState,
    caller: &Caller,
    id: u64,
) -> Result<Option<BookRecord>, ApiError> {
    let book = state
        .db
        .get_book(id)
        .map_err(|e| ApiError::internal("Failed to load book", e))?;

    if let Caller::User(identity) = caller {
        let allowed = book.as_ref().is_some_and(|b| caller.can_modify(b));
        if !allowed {
            tracing::debug!(book_id = id, caller = %identity, "Ownership check failed");
            return Err(ApiError::forbidden("You are not allowed to modify this book"));
        }
    }

    Ok(book)
}

/// Keep the status axum reports, so a body over the route limit stays a 413.
fn multipart_error(context: &str, e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(format!("{context}: {}", e.body_text()))
    } else {
        ApiError::bad_request(format!("{context}: {e}"))
    }
}

async fn field_text(field: Field<'_>, name: &str) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid {name}: {e}")))
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value.ok_or_else(|| ApiError::bad_request(format!("{name} field is required")))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" | "" => Some(false),
        _ => None,
    }
}

fn book_to_response(book: &BookRecord, caller: &Caller) -> BookResponse {
    BookResponse {
        id: book.id,
        title: book.title.clone(),
        description: book.description.clone(),
        author: book.author.clone(),
        cover_id: book.cover_id.clone(),
        progress: book.progress,
        owner_email: book.owner_email.clone(),
        is_public: book.is_public,
        is_owner: caller.owns(book),
        created_at: book.created_at.to_rfc3339(),
        updated_at: book.updated_at.to_rfc3339(),
    }
}
