//! Shared types, errors, and configuration for Docbox.
//!
//! This crate provides common types used across all other crates:
//! - Application configuration (server, database, storage, rate limit)
//! - Application-wide error types
//! - Pagination types for list endpoints
//! - The fixed-window request rate limiter

pub mod config;
pub mod error;
pub mod rate_limit;
pub mod types;

pub use config::{
    AppConfig, AssetHostSettings, Environment, ObjectStoreSettings, Provider, StorageSettings,
};
pub use error::{AppError, AppResult};
pub use rate_limit::RateLimiter;
pub use types::{PageRequest, PageResponse};
