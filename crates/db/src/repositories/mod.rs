//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod business;
pub mod document;

pub use business::{BusinessError, BusinessRepository};
pub use document::{DocumentError, DocumentRepository, NewDocument};
