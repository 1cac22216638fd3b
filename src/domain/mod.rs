//! Storage-agnostic contracts for the catalog, accounts and orders.
//!
//! Handlers and services only see these traits and `DomainError`; the SeaORM
//! implementations live under `infrastructure::repositories`.

pub mod errors;
pub mod repositories;

pub use errors::DomainError;
pub use repositories::*;
