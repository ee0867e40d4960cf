use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;
use workhive_config::StorageSettings;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("File exceeds the upload limit of {0} bytes")]
    TooLarge(u64),
    #[error("Blob not found")]
    NotFound,
}

/// Local-disk blob store. Keys are `<prefix>/<uuid>`, generated here, so a
/// key never contains caller-controlled path segments.
pub struct BlobStorage {
    root: PathBuf,
    max_bytes: u64,
}

impl BlobStorage {
    pub fn new(settings: &StorageSettings) -> Self {
        Self {
            root: PathBuf::from(&settings.upload_dir),
            max_bytes: settings.max_upload_bytes,
        }
    }

    /// Writes the blob and returns its storage key.
    pub async fn put(&self, prefix: &str, bytes: &[u8]) -> Result<String, StorageError> {
        if bytes.len() as u64 > self.max_bytes {
            return Err(StorageError::TooLarge(self.max_bytes));
        }

        let key = format!("{}/{}", prefix, uuid::Uuid::new_v4());
        let path = self.root.join(&key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        debug!(%key, size = bytes.len(), "Stored blob");
        Ok(key)
    }

    pub async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        match tokio::fs::read(self.root.join(key)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Idempotent: deleting a missing blob is not an error.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.root.join(key)).await {
            Ok(()) => {
                debug!(%key, "Deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
