//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Credentials submitted to signup and signin.
///
/// Missing fields deserialize as empty strings so that the auth flow, not the
/// JSON layer, reports them as invalid input.
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response to a successful signin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigninResponse {
    pub token: String,
    pub email: String,
}

/// Response from the protected identity endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeResponse {
    pub email: String,
}
