//! Uniform dispatch over the concrete storage backends.

use bytes::Bytes;

use super::asset_host::AssetHostBackend;
use super::error::StorageError;
use super::kind::{StorageKind, UploadResult};
use super::local::LocalBackend;
use super::object_store::ObjectStoreBackend;

/// A constructed storage backend.
///
/// A closed set of variants rather than a trait object, so resolving a
/// persisted [`StorageKind`] stays a total function. Each variant holds
/// only immutable configuration and a pooled client; instances are cheap
/// to construct per call and safe to share across tasks.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// Local filesystem.
    Local(LocalBackend),
    /// S3-compatible object store.
    ObjectStore(ObjectStoreBackend),
    /// Managed asset host.
    AssetHost(AssetHostBackend),
}

impl StorageBackend {
    /// The kind this backend stores under.
    #[must_use]
    pub const fn kind(&self) -> StorageKind {
        match self {
            Self::Local(_) => StorageKind::Local,
            Self::ObjectStore(_) => StorageKind::ObjectStore,
            Self::AssetHost(_) => StorageKind::AssetHost,
        }
    }

    /// Stores `content` and returns the kind+key pair to persist.
    ///
    /// No key is emitted unless the store call durably succeeded; a failed
    /// upload never produces a catalog-worthy result.
    pub async fn upload(
        &self,
        content: Bytes,
        content_type: &str,
        account_id: &str,
        filename: &str,
    ) -> Result<UploadResult, StorageError> {
        match self {
            Self::Local(backend) => backend.upload(content, account_id, filename).await,
            Self::ObjectStore(backend) => {
                backend
                    .upload(content, content_type, account_id, filename)
                    .await
            }
            Self::AssetHost(backend) => {
                backend
                    .upload(content, content_type, account_id, filename)
                    .await
            }
        }
    }

    /// Reads the content stored under `key` into memory.
    ///
    /// A key that does not resolve to existing content is
    /// [`StorageError::NotFound`], never a generic failure.
    pub async fn download(&self, key: &str) -> Result<Bytes, StorageError> {
        match self {
            Self::Local(backend) => backend.download(key).await,
            Self::ObjectStore(backend) => backend.download(key).await,
            Self::AssetHost(backend) => backend.download(key).await,
        }
    }

    /// Returns an access URL for `key`, or `None` when the backend has no
    /// URL concept (local disk).
    pub async fn get_url(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Self::Local(backend) => Ok(backend.get_url(key)),
            Self::ObjectStore(backend) => backend.presign_download(key).await.map(Some),
            Self::AssetHost(backend) => backend.delivery_url(key).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_kind_matches_variant() {
        let local = StorageBackend::Local(LocalBackend::new("/tmp/up"));
        assert_eq!(local.kind(), StorageKind::Local);
    }

    #[tokio::test]
    async fn test_local_scenario_from_contract() {
        // upload report.txt (7 bytes) for acct-1 under /tmp-like root:
        // key is <root>/acct-1/report.txt, download round-trips, no URL.
        let dir = tempfile::tempdir().expect("should create temp dir");
        let backend = StorageBackend::Local(LocalBackend::new(dir.path()));

        let result = backend
            .upload(Bytes::from_static(b"7 bytes"), "text/plain", "acct-1", "report.txt")
            .await
            .expect("upload should succeed");

        assert_eq!(result.kind, StorageKind::Local);
        assert_eq!(
            result.key,
            dir.path()
                .join("acct-1")
                .join("report.txt")
                .to_string_lossy()
        );

        let downloaded = backend
            .download(&result.key)
            .await
            .expect("download should succeed");
        assert_eq!(downloaded, Bytes::from_static(b"7 bytes"));

        let url = backend.get_url(&result.key).await.expect("no failure");
        assert!(url.is_none());
    }
}
