//! Managed asset host backend.
//!
//! Uploads go to the host's HTTP API with a signed multipart request; the
//! host auto-detects the resource type (image/video/raw) and that type is
//! encoded into the composite key `{resource_type}:{public_id}` so the
//! correct decode path can be chosen later. Downloads and URLs rebuild a
//! deterministic delivery URL from the cloud name, a fixed asset version
//! stamp, and the public id.

use bytes::Bytes;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use docbox_shared::AssetHostSettings;

use super::error::StorageError;
use super::kind::{StorageKind, UploadResult};

/// Version stamp baked into every delivery URL.
const ASSET_VERSION: &str = "1759064043";

/// Stores documents on a managed asset host, keyed `{resource_type}:{public_id}`.
#[derive(Debug, Clone)]
pub struct AssetHostBackend {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

/// The subset of the host's upload response we persist.
#[derive(Debug, Deserialize)]
struct HostUploadResponse {
    resource_type: String,
    public_id: String,
}

impl AssetHostBackend {
    /// Builds the backend from a credential bundle.
    ///
    /// Fails fast with [`StorageError::Configuration`] when the cloud name
    /// or either API credential is empty.
    pub fn from_settings(settings: &AssetHostSettings) -> Result<Self, StorageError> {
        let required = [
            ("cloud_name", &settings.cloud_name),
            ("api_key", &settings.api_key),
            ("api_secret", &settings.api_secret),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(StorageError::configuration(format!(
                    "asset host {field} is required"
                )));
            }
        }

        Ok(Self {
            client: reqwest::Client::new(),
            cloud_name: settings.cloud_name.clone(),
            api_key: settings.api_key.clone(),
            api_secret: settings.api_secret.clone(),
        })
    }

    fn upload_endpoint(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/auto/upload",
            self.cloud_name
        )
    }

    /// SHA-256 request signature over the alphabetically ordered signed
    /// parameters followed by the API secret.
    fn sign(&self, folder: &str, public_id: &str, timestamp: i64) -> String {
        let payload = format!(
            "folder={folder}&public_id={public_id}&timestamp={timestamp}{}",
            self.api_secret
        );
        hex::encode(Sha256::digest(payload.as_bytes()))
    }

    /// Sends the raw bytes with an account-scoped folder prefix, using the
    /// filename as the requested public identifier. The host's detected
    /// resource type becomes the first component of the returned key.
    pub async fn upload(
        &self,
        content: Bytes,
        content_type: &str,
        account_id: &str,
        filename: &str,
    ) -> Result<UploadResult, StorageError> {
        let folder = format!("{account_id}/");
        let timestamp = Utc::now().timestamp();
        let signature = self.sign(&folder, filename, timestamp);

        let file_part = Part::bytes(content.to_vec())
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| StorageError::backend(e.to_string()))?;
        let form = Form::new()
            .part("file", file_part)
            .text("folder", folder)
            .text("public_id", filename.to_string())
            .text("timestamp", timestamp.to_string())
            .text("api_key", self.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .client
            .post(self.upload_endpoint())
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::backend(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::backend(format!(
                "asset host upload failed with {status}: {body}"
            )));
        }

        let parsed: HostUploadResponse = response
            .json()
            .await
            .map_err(|e| StorageError::backend(e.to_string()))?;

        Ok(UploadResult {
            kind: StorageKind::AssetHost,
            key: format!("{}:{}", parsed.resource_type, parsed.public_id),
        })
    }

    /// Rebuilds the deterministic delivery URL for a stored key.
    ///
    /// The URL always routes through the image pipeline, even when the
    /// recorded resource type is video or raw; non-image assets therefore
    /// resolve to the wrong path. Known inconsistency, kept as-is: the
    /// resource type stays in the key so a type-aware constructor can be
    /// introduced later without a data migration.
    pub fn delivery_url(&self, key: &str) -> Result<String, StorageError> {
        let Some((_resource_type, public_id)) = key.split_once(':') else {
            return Err(StorageError::invalid_key(format!(
                "asset host key missing resource type prefix: {key}"
            )));
        };

        Ok(format!(
            "https://res.cloudinary.com/{}/image/upload/v{ASSET_VERSION}/{public_id}.png",
            self.cloud_name
        ))
    }

    /// Fetches the delivery URL over the network.
    pub async fn download(&self, key: &str) -> Result<Bytes, StorageError> {
        let url = self.delivery_url(key)?;

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StorageError::backend(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::not_found(key));
        }
        if !response.status().is_success() {
            return Err(StorageError::backend(format!(
                "asset host delivery failed with {}",
                response.status()
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| StorageError::backend(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn full_settings() -> AssetHostSettings {
        AssetHostSettings {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
        }
    }

    #[rstest]
    #[case("cloud_name")]
    #[case("api_key")]
    #[case("api_secret")]
    fn test_constructor_fails_fast_on_missing_field(#[case] field: &str) {
        let mut settings = full_settings();
        match field {
            "cloud_name" => settings.cloud_name.clear(),
            "api_key" => settings.api_key.clear(),
            _ => settings.api_secret.clear(),
        }

        let err = AssetHostBackend::from_settings(&settings).unwrap_err();
        match err {
            StorageError::Configuration(msg) => assert!(msg.contains(field)),
            other => panic!("expected Configuration, got {other}"),
        }
    }

    #[test]
    fn test_delivery_url_components() {
        let backend =
            AssetHostBackend::from_settings(&full_settings()).expect("should construct");

        let url = backend
            .delivery_url("image:acct-1/photo.jpg")
            .expect("key is well formed");

        assert_eq!(
            url,
            "https://res.cloudinary.com/demo/image/upload/v1759064043/acct-1/photo.jpg.png"
        );
    }

    #[test]
    fn test_delivery_url_ignores_recorded_resource_type() {
        let backend =
            AssetHostBackend::from_settings(&full_settings()).expect("should construct");

        // Video and raw assets still route through the image pipeline.
        for key in ["video:clip", "raw:blob", "image:pic"] {
            let url = backend.delivery_url(key).expect("key is well formed");
            assert!(url.contains("/image/upload/"), "unexpected url: {url}");
        }
    }

    #[test]
    fn test_malformed_key_fails_loudly() {
        let backend =
            AssetHostBackend::from_settings(&full_settings()).expect("should construct");

        let err = backend.delivery_url("no-separator").unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[test]
    fn test_signature_is_deterministic_and_secret_bound() {
        let backend =
            AssetHostBackend::from_settings(&full_settings()).expect("should construct");

        let a = backend.sign("acct/", "file.txt", 1_700_000_000);
        let b = backend.sign("acct/", "file.txt", 1_700_000_000);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64); // sha256 hex

        let other = AssetHostBackend::from_settings(&AssetHostSettings {
            api_secret: "different".to_string(),
            ..full_settings()
        })
        .expect("should construct");
        assert_ne!(a, other.sign("acct/", "file.txt", 1_700_000_000));
    }

    #[cfg(test)]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        // Every well-formed key yields a URL carrying the cloud name, the
        // version stamp, and the public id.
        proptest! {
            #[test]
            fn prop_delivery_url_carries_identity(
                resource in "(image|video|raw)",
                public_id in "[a-zA-Z0-9/_-]{1,40}",
            ) {
                let backend = AssetHostBackend::from_settings(&full_settings())
                    .expect("should construct");
                let key = format!("{resource}:{public_id}");
                let url = backend.delivery_url(&key).expect("well formed");

                prop_assert!(url.contains("/demo/"));
                prop_assert!(url.contains(ASSET_VERSION));
                prop_assert!(url.contains(&public_id));
            }
        }
    }
}
