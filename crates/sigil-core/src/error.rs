//! Domain-level error types.

use thiserror::Error;

/// Domain errors - the taxonomy every auth outcome is translated into.
///
/// Nothing below the auth flow leaks past this enum: store and hasher
/// failures are folded into [`DomainError::ServiceUnavailable`] or
/// [`DomainError::HashingFailure`] with their detail kept for logs only.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Account already exists")]
    AccountExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Hashing failed: {0}")]
    HashingFailure(String),
}

/// Credential store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Store has been shut down")]
    Closed,
}
