//! Shared test helpers for router-level tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response};

use crate::auth::HeaderIdentityResolver;
use crate::config::{AuthMode, Config, ServerConfig, StorageConfig};
use crate::cover_store::LocalCoverStore;
use crate::storage::Database;
use crate::AppState;

pub const BOUNDARY: &str = "buku-test-boundary";

/// Create a test AppState with an in-memory database and a cover store in `temp_dir`.
pub fn test_state(temp_dir: &tempfile::TempDir, auth_mode: AuthMode) -> Arc<AppState> {
    state_with_config(test_config(temp_dir, auth_mode))
}

/// Test configuration rooted in `temp_dir`, for tests that tweak settings first.
pub fn test_config(temp_dir: &tempfile::TempDir, auth_mode: AuthMode) -> Config {
    Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            ..Default::default()
        },
        storage: StorageConfig {
            data_dir: temp_dir.path().join("data").to_string_lossy().to_string(),
            covers_dir: temp_dir.path().join("covers").to_string_lossy().to_string(),
            default_cover: temp_dir.path().join("default.jpg"),
        },
        auth_mode,
        max_upload_size: 1024 * 1024, // 1MB for tests
    }
}

pub fn state_with_config(config: Config) -> Arc<AppState> {
    let db = Database::in_memory().expect("Failed to open test database");
    let cover_store =
        LocalCoverStore::new(&config.storage.covers_dir).expect("Failed to create cover store");

    Arc::new(AppState {
        config,
        db,
        cover_store: Arc::new(cover_store),
        identity_resolver: Arc::new(HeaderIdentityResolver),
    })
}

/// One part of a multipart form: `(name, filename, bytes)`.
pub type Part<'a> = (&'a str, Option<&'a str>, &'a [u8]);

/// A plain text form field.
pub fn field<'a>(name: &'a str, value: &'a str) -> Part<'a> {
    (name, None, value.as_bytes())
}

/// A file form field.
pub fn file<'a>(name: &'a str, filename: &'a str, data: &'a [u8]) -> Part<'a> {
    (name, Some(filename), data)
}

/// Encode parts as a multipart/form-data body using [`BOUNDARY`].
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
            }
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Build a request, optionally carrying an `Authorization` identity.
pub fn request(
    method: &str,
    uri: &str,
    identity: Option<&str>,
    content_type: Option<String>,
    body: Body,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(identity) = identity {
        builder = builder.header(header::AUTHORIZATION, identity);
    }
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(body).expect("Failed to build request")
}

pub fn multipart_request(uri: &str, identity: Option<&str>, parts: &[Part<'_>]) -> Request<Body> {
    request(
        "POST",
        uri,
        identity,
        Some(format!("multipart/form-data; boundary={BOUNDARY}")),
        Body::from(multipart_body(parts)),
    )
}

pub fn json_request(
    method: &str,
    uri: &str,
    identity: Option<&str>,
    value: serde_json::Value,
) -> Request<Body> {
    request(
        method,
        uri,
        identity,
        Some("application/json".to_string()),
        Body::from(value.to_string()),
    )
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body")
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}
