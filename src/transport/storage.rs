//! Blob storage for session exports

use super::TransportError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Opaque "persist blob" capability. Returns a location string for the
/// stored blob.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<String, TransportError>;
}

/// Stores blobs as files in one directory
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Blob names are plain file names
fn check_name(name: &str) -> Result<(), TransportError> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\']);
    if plain {
        Ok(())
    } else {
        Err(TransportError::Storage(format!("invalid blob name {:?}", name)))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<String, TransportError> {
        check_name(name)?;
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.root.join(name);
        let len = bytes.len();
        tokio::fs::write(&path, bytes).await?;

        debug!(path = %path.display(), bytes = len, "blob stored");
        Ok(path.display().to_string())
    }
}
