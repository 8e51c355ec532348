use async_trait::async_trait;

use crate::domain::Credential;
use crate::error::StoreError;

/// Credential store - one record per unique identifier.
///
/// Implementations must reject a second `create` for an identifier atomically,
/// through the backing store's own uniqueness enforcement. Callers never
/// check-then-insert.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist a new credential. A duplicate identifier fails with an error
    /// for which [`CredentialStore::is_duplicate`] returns `true`.
    async fn create(&self, credential: Credential) -> Result<(), StoreError>;

    /// Find a credential by its identifier. `None` means no such account.
    async fn find_by_identifier(&self, identifier: &str)
    -> Result<Option<Credential>, StoreError>;

    /// Classify an error returned by `create` as a duplicate identifier.
    fn is_duplicate(&self, err: &StoreError) -> bool {
        matches!(err, StoreError::Constraint(_))
    }

    /// Release held connections. Calling it more than once is a no-op.
    async fn shutdown(&self) -> Result<(), StoreError>;
}
