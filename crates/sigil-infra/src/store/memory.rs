//! In-memory credential store - used in tests and when no database is configured.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use sigil_core::domain::{Credential, mask_identifier};
use sigil_core::error::StoreError;
use sigil_core::ports::CredentialStore;

/// In-memory credential store backed by a HashMap behind an async RwLock.
///
/// Uniqueness holds because the existence check and the insert happen under
/// the same write guard. Data is lost on process restart.
pub struct InMemoryCredentialStore {
    records: RwLock<HashMap<String, Credential>>,
    closed: AtomicBool,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Number of stored credentials.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create(&self, credential: Credential) -> Result<(), StoreError> {
        self.ensure_open()?;

        let mut records = self.records.write().await;
        match records.entry(credential.identifier.clone()) {
            Entry::Occupied(_) => Err(StoreError::Constraint(format!(
                "identifier {} already exists",
                mask_identifier(&credential.identifier)
            ))),
            Entry::Vacant(slot) => {
                slot.insert(credential);
                Ok(())
            }
        }
    }

    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Credential>, StoreError> {
        self.ensure_open()?;

        let records = self.records.read().await;
        Ok(records.get(identifier).cloned())
    }

    async fn shutdown(&self) -> Result<(), StoreError> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::info!("In-memory credential store shut down");
        }
        Ok(())
    }
}
