//! buku-server - a small REST API for a personal book catalog
//!
//! This crate provides CRUD over book records with:
//! - Optional cover image upload, stored on the local filesystem
//! - redb embedded database for records (ACID, MVCC, crash-safe)
//! - An open mode and a header-identity mode with per-user ownership and visibility

pub mod api;
pub mod auth;
pub mod config;
pub mod cover_store;
pub mod storage;
#[cfg(test)]
pub mod testutil;

use std::sync::Arc;

use auth::IdentityResolver;
use config::Config;
use cover_store::CoverStore;
use storage::Database;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub cover_store: Arc<dyn CoverStore>,
    pub identity_resolver: Arc<dyn IdentityResolver>,
}
