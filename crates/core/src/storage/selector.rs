//! Backend selection policy.
//!
//! Two directions: `select_for_upload` decides where NEW documents go from
//! the current configuration; `select_for_kind`/`select_for_record` resolve
//! the backend a PREVIOUSLY stored document was written with, independent
//! of the current environment, so old documents stay retrievable after the
//! default provider changes.

use docbox_shared::{Environment, Provider, StorageSettings};

use super::asset_host::AssetHostBackend;
use super::backend::StorageBackend;
use super::error::StorageError;
use super::kind::StorageKind;
use super::local::LocalBackend;
use super::object_store::ObjectStoreBackend;

/// Chooses the backend for a new upload.
///
/// In `dev` this is always local disk, whatever else is configured. In
/// `prod` the configured provider is used and an incomplete credential
/// bundle is a [`StorageError::Configuration`] rather than a silent local
/// fallback; only the absence of any provider preference selects local.
pub fn select_for_upload(settings: &StorageSettings) -> Result<StorageBackend, StorageError> {
    if settings.environment == Environment::Dev {
        return Ok(local(settings));
    }

    match settings.provider {
        Some(Provider::ObjectStore) => object_store(settings),
        Some(Provider::AssetHost) => asset_host(settings),
        None => Ok(local(settings)),
    }
}

/// Resolves the backend for a persisted kind, independent of environment.
///
/// Fails with [`StorageError::Configuration`] when the credentials that
/// kind needs are missing, even if a different provider's credentials are
/// present.
pub fn select_for_kind(
    kind: StorageKind,
    settings: &StorageSettings,
) -> Result<StorageBackend, StorageError> {
    match kind {
        StorageKind::Local => Ok(local(settings)),
        StorageKind::ObjectStore => object_store(settings),
        StorageKind::AssetHost => asset_host(settings),
    }
}

/// Parses a persisted kind tag and resolves its backend.
///
/// A tag no backend recognizes is [`StorageError::UnknownKind`]: persisted
/// data may be corrupt or come from a future schema, and must never be
/// coerced to a default backend.
pub fn select_for_record(
    storage_type: &str,
    settings: &StorageSettings,
) -> Result<StorageBackend, StorageError> {
    let kind = storage_type.parse::<StorageKind>()?;
    select_for_kind(kind, settings)
}

fn local(settings: &StorageSettings) -> StorageBackend {
    StorageBackend::Local(LocalBackend::new(&settings.local_root))
}

fn object_store(settings: &StorageSettings) -> Result<StorageBackend, StorageError> {
    let bundle = settings
        .object_store
        .as_ref()
        .ok_or_else(|| StorageError::configuration("object store credentials are not configured"))?;
    Ok(StorageBackend::ObjectStore(
        ObjectStoreBackend::from_settings(bundle)?,
    ))
}

fn asset_host(settings: &StorageSettings) -> Result<StorageBackend, StorageError> {
    let bundle = settings
        .asset_host
        .as_ref()
        .ok_or_else(|| StorageError::configuration("asset host credentials are not configured"))?;
    Ok(StorageBackend::AssetHost(AssetHostBackend::from_settings(
        bundle,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docbox_shared::{AssetHostSettings, ObjectStoreSettings};
    use rstest::rstest;

    fn object_store_settings() -> ObjectStoreSettings {
        ObjectStoreSettings {
            bucket: "docs".to_string(),
            region: "us-east-1".to_string(),
            access_key_id: "ak".to_string(),
            secret_access_key: "sk".to_string(),
            endpoint: String::new(),
        }
    }

    fn asset_host_settings() -> AssetHostSettings {
        AssetHostSettings {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
        }
    }

    #[rstest]
    #[case(None)]
    #[case(Some(Provider::ObjectStore))]
    #[case(Some(Provider::AssetHost))]
    fn test_dev_always_selects_local(#[case] provider: Option<Provider>) {
        let settings = StorageSettings {
            environment: Environment::Dev,
            provider,
            object_store: Some(object_store_settings()),
            asset_host: Some(asset_host_settings()),
            ..StorageSettings::default()
        };

        let backend = select_for_upload(&settings).expect("dev never fails");
        assert_eq!(backend.kind(), StorageKind::Local);
    }

    #[test]
    fn test_prod_without_provider_defaults_to_local() {
        let settings = StorageSettings {
            environment: Environment::Prod,
            provider: None,
            ..StorageSettings::default()
        };

        let backend = select_for_upload(&settings).expect("local needs no credentials");
        assert_eq!(backend.kind(), StorageKind::Local);
    }

    #[test]
    fn test_prod_with_complete_object_store_selects_it() {
        let settings = StorageSettings {
            environment: Environment::Prod,
            provider: Some(Provider::ObjectStore),
            object_store: Some(object_store_settings()),
            ..StorageSettings::default()
        };

        let backend = select_for_upload(&settings).expect("credentials are complete");
        assert_eq!(backend.kind(), StorageKind::ObjectStore);
    }

    #[test]
    fn test_prod_incomplete_object_store_errors_instead_of_falling_back() {
        let mut bundle = object_store_settings();
        bundle.secret_access_key.clear();
        let settings = StorageSettings {
            environment: Environment::Prod,
            provider: Some(Provider::ObjectStore),
            object_store: Some(bundle),
            ..StorageSettings::default()
        };

        let err = select_for_upload(&settings).unwrap_err();
        assert!(matches!(err, StorageError::Configuration(_)));
    }

    #[test]
    fn test_prod_object_store_without_bundle_errors() {
        let settings = StorageSettings {
            environment: Environment::Prod,
            provider: Some(Provider::ObjectStore),
            object_store: None,
            ..StorageSettings::default()
        };

        let err = select_for_upload(&settings).unwrap_err();
        assert!(matches!(err, StorageError::Configuration(_)));
    }

    #[test]
    fn test_prod_with_complete_asset_host_selects_it() {
        let settings = StorageSettings {
            environment: Environment::Prod,
            provider: Some(Provider::AssetHost),
            asset_host: Some(asset_host_settings()),
            ..StorageSettings::default()
        };

        let backend = select_for_upload(&settings).expect("credentials are complete");
        assert_eq!(backend.kind(), StorageKind::AssetHost);
    }

    #[test]
    fn test_select_for_kind_is_environment_independent() {
        // A document stored via the object store stays resolvable even
        // though the environment now defaults uploads to local.
        let settings = StorageSettings {
            environment: Environment::Dev,
            provider: None,
            object_store: Some(object_store_settings()),
            ..StorageSettings::default()
        };

        let backend =
            select_for_kind(StorageKind::ObjectStore, &settings).expect("should resolve");
        assert_eq!(backend.kind(), StorageKind::ObjectStore);
    }

    #[test]
    fn test_select_for_kind_needs_that_kinds_credentials() {
        // Asset host credentials being present does not help an
        // object-store record.
        let settings = StorageSettings {
            environment: Environment::Prod,
            provider: Some(Provider::AssetHost),
            object_store: None,
            asset_host: Some(asset_host_settings()),
            ..StorageSettings::default()
        };

        let err = select_for_kind(StorageKind::ObjectStore, &settings).unwrap_err();
        assert!(matches!(err, StorageError::Configuration(_)));
    }

    #[test]
    fn test_select_for_record_round_trips_all_kinds() {
        let settings = StorageSettings {
            environment: Environment::Prod,
            object_store: Some(object_store_settings()),
            asset_host: Some(asset_host_settings()),
            ..StorageSettings::default()
        };

        for kind in StorageKind::ALL {
            let backend =
                select_for_record(kind.as_str(), &settings).expect("tag should resolve");
            assert_eq!(backend.kind(), kind);
        }
    }

    #[test]
    fn test_select_for_record_rejects_unknown_tag() {
        let settings = StorageSettings::default();

        let err = select_for_record("s3", &settings).unwrap_err();
        assert!(matches!(err, StorageError::UnknownKind(tag) if tag == "s3"));
    }
}
