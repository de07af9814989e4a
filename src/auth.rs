//! Caller identification.
//!
//! The catalog has no real credentials: in header mode the raw `Authorization`
//! value *is* the caller's identity (conventionally an email address). Nothing is
//! verified, so this is a partitioning scheme rather than a security boundary.
//! Resolution goes through [`IdentityResolver`] so a verifying implementation can
//! replace [`HeaderIdentityResolver`] without touching the handlers.

use std::fmt;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use thiserror::Error;

use crate::api::response::ApiError;
use crate::config::AuthMode;
use crate::storage::models::BookRecord;
use crate::AppState;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    Missing,
    #[error("Authorization header is not valid text")]
    Malformed,
}

/// The identity string a request claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Self {
        Identity(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turns request headers into an identity.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, parts: &Parts) -> Result<Identity, AuthError>;
}

/// Uses the trimmed `Authorization` header value as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderIdentityResolver;

impl IdentityResolver for HeaderIdentityResolver {
    fn resolve(&self, parts: &Parts) -> Result<Identity, AuthError> {
        let value = parts.headers.get(AUTHORIZATION).ok_or(AuthError::Missing)?;
        let value = value.to_str().map_err(|_| AuthError::Malformed)?.trim();
        if value.is_empty() {
            return Err(AuthError::Missing);
        }
        Ok(Identity::new(value))
    }
}

/// Who is making a request, as far as book access is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// Open mode: no identity and no restrictions.
    Anonymous,
    User(Identity),
}

impl Caller {
    /// Owner string to stamp on books this caller creates.
    pub fn owner_email(&self) -> Option<String> {
        match self {
            Caller::Anonymous => None,
            Caller::User(identity) => Some(identity.as_str().to_string()),
        }
    }

    /// Listing and cover visibility: own books plus public ones.
    pub fn can_read(&self, book: &BookRecord) -> bool {
        match self {
            Caller::Anonymous => true,
            Caller::User(identity) => book.is_public || book.is_owned_by(identity.as_str()),
        }
    }

    /// Update/delete rights: owner only.
    pub fn can_modify(&self, book: &BookRecord) -> bool {
        match self {
            Caller::Anonymous => true,
            Caller::User(identity) => book.is_owned_by(identity.as_str()),
        }
    }

    /// Derived `isOwner` flag; only meaningful for identified callers.
    pub fn owns(&self, book: &BookRecord) -> Option<bool> {
        match self {
            Caller::Anonymous => None,
            Caller::User(identity) => Some(book.is_owned_by(identity.as_str())),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::unauthorized(e.to_string())
    }
}

/// Requires an identity regardless of the configured auth mode.
#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, ApiError> {
        Ok(state.identity_resolver.resolve(parts)?)
    }
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, ApiError> {
        match state.config.auth_mode {
            AuthMode::Open => Ok(Caller::Anonymous),
            AuthMode::Header => Ok(Caller::User(state.identity_resolver.resolve(parts)?)),
        }
    }
}
