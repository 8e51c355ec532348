//! Auth flow - signup, signin, introspection and signout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;

use crate::domain::{Credential, mask_identifier};
use crate::error::DomainError;
use crate::ports::{CredentialStore, PasswordService, TokenService};

/// Auth flow configuration.
#[derive(Debug, Clone)]
pub struct AuthFlowConfig {
    /// Upper bound for every store call and every hash/verify call.
    pub deadline: Duration,
}

impl Default for AuthFlowConfig {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(5),
        }
    }
}

/// Result of a successful signin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    pub token: String,
    pub identifier: String,
}

/// Identity reported back to the holder of a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Introspection {
    pub identifier: String,
}

/// Orchestrates the credential store, the password hasher and the token issuer.
pub struct AuthFlow {
    store: Arc<dyn CredentialStore>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
    config: AuthFlowConfig,
    // Verified against on unknown identifiers so both signin failures cost the same.
    decoy_hash: OnceCell<String>,
}

impl AuthFlow {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
        config: AuthFlowConfig,
    ) -> Self {
        Self {
            store,
            passwords,
            tokens,
            config,
            decoy_hash: OnceCell::new(),
        }
    }

    /// Build the decoy hash up front so the first unknown-identifier signin
    /// costs one verify like every later one.
    pub async fn warm_up(&self) -> Result<(), DomainError> {
        self.decoy_hash().await.map(|_| ())
    }

    /// Register a new account. Returns nothing on success: the caller still
    /// has to sign in.
    pub async fn signup(&self, identifier: &str, secret: &str) -> Result<(), DomainError> {
        require_fields(identifier, secret)?;

        let secret_hash = self.hash(secret).await?;
        let credential = Credential::new(identifier.to_string(), secret_hash);

        match self.within("store.create", self.store.create(credential)).await? {
            Ok(()) => {
                tracing::info!(identifier = %mask_identifier(identifier), "Account created");
                Ok(())
            }
            Err(e) if self.store.is_duplicate(&e) => {
                tracing::debug!(
                    identifier = %mask_identifier(identifier),
                    "Signup rejected: identifier already registered"
                );
                Err(DomainError::AccountExists)
            }
            Err(e) => {
                tracing::error!(error = %e, "Credential store failed during signup");
                Err(DomainError::ServiceUnavailable(
                    "credential store unavailable".to_string(),
                ))
            }
        }
    }

    /// Verify credentials and issue a session token.
    ///
    /// Unknown identifiers and wrong secrets produce the same
    /// [`DomainError::InvalidCredentials`].
    pub async fn signin(&self, identifier: &str, secret: &str) -> Result<SignedIn, DomainError> {
        require_fields(identifier, secret)?;

        let lookup = self
            .within("store.find", self.store.find_by_identifier(identifier))
            .await?;

        let credential = match lookup {
            Ok(Some(credential)) => credential,
            Ok(None) => {
                let decoy = self.decoy_hash().await?;
                self.verify(secret, decoy).await?;
                tracing::debug!(
                    identifier = %mask_identifier(identifier),
                    "Signin rejected: unknown identifier"
                );
                return Err(DomainError::InvalidCredentials);
            }
            Err(e) => {
                tracing::error!(error = %e, "Credential store failed during signin");
                return Err(DomainError::ServiceUnavailable(
                    "credential store unavailable".to_string(),
                ));
            }
        };

        if !self.verify(secret, credential.secret_hash).await? {
            tracing::debug!(
                identifier = %mask_identifier(identifier),
                "Signin rejected: secret mismatch"
            );
            return Err(DomainError::InvalidCredentials);
        }

        let token = self
            .tokens
            .generate_token(&credential.identifier, self.tokens.token_lifetime())
            .map_err(|e| {
                tracing::error!(error = %e, "Token issuance failed");
                DomainError::ServiceUnavailable("token issuance failed".to_string())
            })?;

        tracing::info!(identifier = %mask_identifier(identifier), "Signin succeeded");

        Ok(SignedIn {
            token,
            identifier: credential.identifier,
        })
    }

    /// Report the identity asserted by an already-verified token.
    ///
    /// No store lookup happens here: the token's claim stands for its whole
    /// lifetime.
    pub fn introspect(&self, verified_subject: &str) -> Introspection {
        Introspection {
            identifier: verified_subject.to_string(),
        }
    }

    /// Acknowledge a signout. Tokens are not tracked, so an issued token
    /// stays valid until it expires.
    pub fn signout(&self) {
        tracing::debug!("Signout acknowledged");
    }

    async fn hash(&self, secret: &str) -> Result<String, DomainError> {
        let passwords = Arc::clone(&self.passwords);
        let secret = secret.to_owned();
        let task = tokio::task::spawn_blocking(move || passwords.hash(&secret));

        match self.within("password.hash", task).await? {
            Ok(Ok(hash)) => Ok(hash),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Password hashing failed");
                Err(DomainError::HashingFailure(e.to_string()))
            }
            Err(e) => {
                tracing::error!(error = %e, "Password hashing task aborted");
                Err(DomainError::HashingFailure(e.to_string()))
            }
        }
    }

    async fn verify(&self, secret: &str, hash: String) -> Result<bool, DomainError> {
        let passwords = Arc::clone(&self.passwords);
        let secret = secret.to_owned();
        let task = tokio::task::spawn_blocking(move || passwords.verify(&secret, &hash));

        self.within("password.verify", task).await?.map_err(|e| {
            tracing::error!(error = %e, "Password verification task aborted");
            DomainError::HashingFailure(e.to_string())
        })
    }

    async fn decoy_hash(&self) -> Result<String, DomainError> {
        self.decoy_hash
            .get_or_try_init(|| self.hash("sigil-decoy-secret"))
            .await
            .cloned()
    }

    /// Bound `fut` by the configured deadline. Dropping the returned future
    /// drops `fut` with it, which is how an abandoned request cancels
    /// in-flight store work.
    async fn within<F: Future>(
        &self,
        operation: &'static str,
        fut: F,
    ) -> Result<F::Output, DomainError> {
        tokio::time::timeout(self.config.deadline, fut)
            .await
            .map_err(|_| {
                tracing::warn!(
                    operation,
                    deadline_ms = self.config.deadline.as_millis() as u64,
                    "Operation exceeded deadline"
                );
                DomainError::ServiceUnavailable(format!("{operation} timed out"))
            })
    }
}

fn require_fields(identifier: &str, secret: &str) -> Result<(), DomainError> {
    if identifier.is_empty() || secret.is_empty() {
        return Err(DomainError::InvalidInput(
            "Email and password required".to_string(),
        ));
    }
    Ok(())
}
