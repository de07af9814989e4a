mod local;

pub use local::LocalCoverStore;

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoverStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cover not found: {0}")]
    NotFound(String),
    #[error("Invalid cover key: {0}")]
    InvalidKey(String),
}

/// Abstraction over where cover images live.
/// Keys are generated filenames; the book record is the only thing pointing at them.
#[async_trait]
pub trait CoverStore: Send + Sync {
    async fn put(&self, key: &str, data: Bytes) -> Result<(), CoverStoreError>;
    async fn get(&self, key: &str) -> Result<Bytes, CoverStoreError>;
    async fn delete(&self, key: &str) -> Result<(), CoverStoreError>;
    async fn exists(&self, key: &str) -> Result<bool, CoverStoreError>;
}

/// Generate a fresh cover key, keeping the extension of the uploaded filename
/// so the content type can be recovered when the cover is served.
pub fn generate_cover_id(original_name: Option<&str>) -> String {
    let extension = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    format!("{}{extension}", uuid::Uuid::new_v4())
}

/// Content type for a cover, guessed from its key or path.
pub fn content_type_for<P: AsRef<Path>>(key: P) -> String {
    mime_guess::from_path(key)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "image/jpeg".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_cover_id_keeps_extension() {
        let id = generate_cover_id(Some("My Cover.PNG"));
        assert!(id.ends_with(".png"));
        assert_eq!(id.len(), 36 + 4);
    }

    #[test]
    fn test_generate_cover_id_without_name() {
        let id = generate_cover_id(None);
        assert_eq!(id.len(), 36);
        assert!(!id.contains('.'));
    }

    #[test]
    fn test_generate_cover_id_drops_odd_extension() {
        let id = generate_cover_id(Some("evil.j/pg"));
        assert!(!id.contains('/'));
    }

    #[test]
    fn test_generate_cover_id_is_unique() {
        assert_ne!(generate_cover_id(Some("a.jpg")), generate_cover_id(Some("a.jpg")));
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("abc.png"), "image/png");
        assert_eq!(content_type_for("abc.jpg"), "image/jpeg");
        assert_eq!(content_type_for("abc"), "image/jpeg");
    }
}
