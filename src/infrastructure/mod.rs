//! Everything that touches SQLite, HTTP plumbing or the process environment.
//!
//! `db` owns the schema, `repositories` implement the domain traits on top of
//! SeaORM and `state` wires them into the handlers. `auth` covers password
//! hashing, session tokens and the `AuthUser` extractor.

pub mod auth;
pub mod config;
pub mod db;
pub mod repositories;
pub mod seed;
pub mod server;
pub mod state;

pub use repositories::*;
pub use state::AppState;
