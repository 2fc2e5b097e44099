//! Document storage backends and their selection policy.
//!
//! Three physical backends sit behind one uniform contract:
//! - Local disk (development, or when no cloud provider is configured)
//! - S3-compatible object store via Apache OpenDAL
//! - A managed asset host reached over HTTP
//!
//! # Architecture
//!
//! ```text
//! upload:    select_for_upload(settings) ─> StorageBackend ─> upload()
//!                                            returns {kind, key}; caller persists
//! retrieval: select_for_record(kind_tag, settings) ─> StorageBackend
//!                                            ─> download(key) / get_url(key)
//! ```
//!
//! Selection is a pure function of the immutable settings (or of a
//! persisted kind tag); nothing here is cached between calls.

mod asset_host;
mod backend;
mod error;
mod kind;
mod local;
mod object_store;
mod selector;

pub use asset_host::AssetHostBackend;
pub use backend::StorageBackend;
pub use error::StorageError;
pub use kind::{StorageKind, UploadResult};
pub use local::LocalBackend;
pub use object_store::ObjectStoreBackend;
pub use selector::{select_for_kind, select_for_record, select_for_upload};
