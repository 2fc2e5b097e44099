//! Storage kind and upload result value types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::StorageError;

/// Identifies which backend a stored document's key belongs to.
///
/// Chosen at upload time and persisted alongside the key. A key is only
/// meaningful paired with its kind; the tag round-trips exactly through
/// persistence and anything unrecognized fails as [`StorageError::UnknownKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// Local filesystem under the configured upload root.
    Local,
    /// S3-compatible object store.
    ObjectStore,
    /// Managed asset host.
    AssetHost,
}

impl StorageKind {
    /// All kinds, for exhaustive tests and diagnostics.
    pub const ALL: [Self; 3] = [Self::Local, Self::ObjectStore, Self::AssetHost];

    /// The tag persisted in the document catalog.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::ObjectStore => "object_store",
            Self::AssetHost => "asset_host",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageKind {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "object_store" => Ok(Self::ObjectStore),
            "asset_host" => Ok(Self::AssetHost),
            other => Err(StorageError::UnknownKind(other.to_string())),
        }
    }
}

/// Outcome of a successful upload: the kind+key pair the caller persists.
///
/// This is the only data the storage layer hands back; it never writes to
/// the catalog itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    /// Backend that stored the content.
    pub kind: StorageKind,
    /// Backend-specific opaque locator.
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        for kind in StorageKind::ALL {
            let parsed: StorageKind = kind.as_str().parse().expect("tag should parse");
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        for tag in ["s3", "cloudinary", "LOCAL", "", "gcs"] {
            let err = tag.parse::<StorageKind>().unwrap_err();
            assert!(matches!(err, StorageError::UnknownKind(t) if t == tag));
        }
    }

    #[test]
    fn test_display_matches_tag() {
        assert_eq!(StorageKind::Local.to_string(), "local");
        assert_eq!(StorageKind::ObjectStore.to_string(), "object_store");
        assert_eq!(StorageKind::AssetHost.to_string(), "asset_host");
    }
}
