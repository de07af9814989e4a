use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::{ApiError, JSend};
use crate::auth::Identity;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CheckAuthResponse {
    pub email: String,
    #[serde(rename = "isAuthenticated")]
    pub is_authenticated: bool,
    /// True when no stored book belongs to this identity yet
    #[serde(rename = "isNew")]
    pub is_new: bool,
}

/// Confirm the caller's identity. Always requires the header, whatever the auth mode.
pub async fn check_auth(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<JSend<CheckAuthResponse>>, ApiError> {
    let has_books = state
        .db
        .owner_has_books(identity.as_str())
        .map_err(|e| ApiError::internal("Failed to look up identity", e))?;

    Ok(JSend::success(CheckAuthResponse {
        email: identity.as_str().to_string(),
        is_authenticated: true,
        is_new: !has_books,
    }))
}
