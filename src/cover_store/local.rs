use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use super::{CoverStore, CoverStoreError};

/// Cover store backed by a directory on the local filesystem.
pub struct LocalCoverStore {
    base_path: PathBuf,
}

impl LocalCoverStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, std::io::Error> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    // Keys must be plain filenames inside the base directory.
    fn cover_path(&self, key: &str) -> Result<PathBuf, CoverStoreError> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(CoverStoreError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(key))
    }
}

#[async_trait]
impl CoverStore for LocalCoverStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<(), CoverStoreError> {
        let path = self.cover_path(key)?;
        tokio::fs::write(&path, &data).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, CoverStoreError> {
        let path = self.cover_path(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CoverStoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CoverStoreError> {
        let path = self.cover_path(key)?;
        if tokio::fs::try_exists(&path).await? {
            tokio::fs::remove_file(&path).await?;
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CoverStoreError> {
        let path = self.cover_path(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }
}
