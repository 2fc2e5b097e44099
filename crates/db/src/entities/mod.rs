//! `SeaORM` entity definitions.

pub mod businesses;
pub mod documents;
