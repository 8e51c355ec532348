//! Authentication ports: token issuance/verification and password hashing.

use chrono::TimeDelta;

/// Verified claims extracted from a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// The account identifier the token asserts.
    pub subject: String,
    /// Unix timestamp (seconds) the token was issued at.
    pub issued_at: i64,
    /// Unix timestamp (seconds) from which the token is expired.
    pub expires_at: i64,
}

/// Token service trait - issues and verifies signed session tokens.
pub trait TokenService: Send + Sync {
    /// Issue a token asserting `subject`, valid for `lifetime` from now.
    fn generate_token(&self, subject: &str, lifetime: TimeDelta) -> Result<String, AuthError>;

    /// Verify signature and expiry and return the asserted claims.
    ///
    /// Returns [`AuthError::InvalidToken`] for anything structurally wrong or
    /// badly signed and [`AuthError::TokenExpired`] for a genuine token past
    /// its expiry.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime applied to tokens issued at signin.
    fn token_lifetime(&self) -> TimeDelta;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password with a fresh random salt.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a stored hash in constant time.
    ///
    /// A mismatch is `false`, never an error.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Token issuance failed: {0}")]
    TokenIssue(String),

    #[error("Hashing error: {0}")]
    HashingError(String),
}
