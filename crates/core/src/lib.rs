//! Core storage abstraction for Docbox.
//!
//! This crate contains the storage layer with ZERO web or database
//! dependencies: which physical backend services an upload, download, or
//! URL request, and how heterogeneous provider semantics are hidden behind
//! one uniform contract.
//!
//! # Modules
//!
//! - `storage` - Storage kinds, backends, and the selection policy

pub mod storage;
