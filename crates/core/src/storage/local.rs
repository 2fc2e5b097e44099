//! Local filesystem backend.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs;
use uuid::Uuid;

use super::error::StorageError;
use super::kind::{StorageKind, UploadResult};

/// Stores documents on local disk under `<root>/<account_id>/<filename>`.
///
/// Keys are full filesystem paths. There is no URL concept for local
/// storage, so `get_url` always yields `None`. Filename collisions
/// overwrite the previous content (no versioning).
#[derive(Debug, Clone)]
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    /// Creates a backend rooted at `root`. The directory is created lazily
    /// on first upload.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The configured upload root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `content` under `<root>/<account_id>/<filename>` and returns
    /// the resulting path as the storage key.
    ///
    /// The bytes are staged in a temporary sibling file and atomically
    /// renamed into place, so an aborted or failed upload never leaves a
    /// readable partial file at the final path.
    pub async fn upload(
        &self,
        content: Bytes,
        account_id: &str,
        filename: &str,
    ) -> Result<UploadResult, StorageError> {
        let dir = self.root.join(account_id);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::backend(e.to_string()))?;

        let path = dir.join(filename);
        let staging = dir.join(format!(".{filename}.{}.tmp", Uuid::new_v4()));

        if let Err(e) = fs::write(&staging, &content).await {
            let _ = fs::remove_file(&staging).await;
            return Err(StorageError::backend(e.to_string()));
        }
        if let Err(e) = fs::rename(&staging, &path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(StorageError::backend(e.to_string()));
        }

        Ok(UploadResult {
            kind: StorageKind::Local,
            key: path.to_string_lossy().into_owned(),
        })
    }

    /// Reads the file at `key` into memory.
    pub async fn download(&self, key: &str) -> Result<Bytes, StorageError> {
        match fs::read(key).await {
            Ok(content) => Ok(Bytes::from(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::not_found(key))
            }
            Err(e) => Err(StorageError::backend(e.to_string())),
        }
    }

    /// Local storage has no public URL.
    #[must_use]
    pub fn get_url(&self, _key: &str) -> Option<String> {
        None
    }
}
