//! S3-compatible object store backend using Apache OpenDAL.

use std::time::Duration;

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};

use docbox_shared::ObjectStoreSettings;

use super::error::StorageError;
use super::kind::{StorageKind, UploadResult};

/// Presigned download URLs stay valid for one hour.
const PRESIGN_TTL: Duration = Duration::from_secs(3600);

/// Stores documents in an S3-compatible bucket keyed `{account_id}/{filename}`.
#[derive(Debug, Clone)]
pub struct ObjectStoreBackend {
    op: Operator,
    bucket: String,
}

impl ObjectStoreBackend {
    /// Builds the backend from a credential bundle.
    ///
    /// Fails fast with [`StorageError::Configuration`] when the bucket or
    /// any credential field is empty; a partially configured object store
    /// must never be selected silently.
    pub fn from_settings(settings: &ObjectStoreSettings) -> Result<Self, StorageError> {
        let required = [
            ("bucket", &settings.bucket),
            ("region", &settings.region),
            ("access_key_id", &settings.access_key_id),
            ("secret_access_key", &settings.secret_access_key),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(StorageError::configuration(format!(
                    "object store {field} is required"
                )));
            }
        }

        let mut builder = services::S3::default()
            .bucket(&settings.bucket)
            .region(&settings.region)
            .access_key_id(&settings.access_key_id)
            .secret_access_key(&settings.secret_access_key);
        if !settings.endpoint.is_empty() {
            builder = builder.endpoint(&settings.endpoint);
        }

        let op = Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish();

        Ok(Self {
            op,
            bucket: settings.bucket.clone(),
        })
    }

    /// Composite object key for an account's file.
    #[must_use]
    pub fn object_key(account_id: &str, filename: &str) -> String {
        format!("{account_id}/{filename}")
    }

    /// The configured bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Single synchronous put preserving the declared content type.
    pub async fn upload(
        &self,
        content: Bytes,
        content_type: &str,
        account_id: &str,
        filename: &str,
    ) -> Result<UploadResult, StorageError> {
        let key = Self::object_key(account_id, filename);

        self.op
            .write_with(&key, content)
            .content_type(content_type)
            .await
            .map_err(|e| StorageError::backend(e.to_string()))?;

        Ok(UploadResult {
            kind: StorageKind::ObjectStore,
            key,
        })
    }

    /// Single get; a missing object surfaces as `NotFound`.
    pub async fn download(&self, key: &str) -> Result<Bytes, StorageError> {
        match self.op.read(key).await {
            Ok(buffer) => Ok(buffer.to_bytes()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::not_found(key)),
            Err(e) => Err(StorageError::backend(e.to_string())),
        }
    }

    /// Presigns a time-limited GET URL for `key`.
    ///
    /// Signing is a local computation; the key's existence is deliberately
    /// not checked here (non-validating contract).
    pub async fn presign_download(&self, key: &str) -> Result<String, StorageError> {
        let presigned = self
            .op
            .presign_read(key, PRESIGN_TTL)
            .await
            .map_err(|e| StorageError::backend(e.to_string()))?;
        Ok(presigned.uri().to_string())
    }
}
