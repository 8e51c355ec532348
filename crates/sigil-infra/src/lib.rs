//! # Sigil Infrastructure
//!
//! Concrete implementations of the ports defined in `sigil-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory store only
//! - `postgres` - PostgreSQL credential store via SeaORM
//! - `auth` - JWT + Argon2 authentication

pub mod database;
pub mod store;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use store::InMemoryCredentialStore;

#[cfg(feature = "auth")]
pub use auth::{Argon2Config, Argon2PasswordService, JwtConfig, JwtTokenService};

#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, PostgresCredentialStore};
