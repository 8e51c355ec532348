//! PostgreSQL credential store.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use sea_orm::{DbConn, DbErr, EntityTrait, SqlErr};

use sigil_core::domain::{Credential, mask_identifier};
use sigil_core::error::StoreError;
use sigil_core::ports::CredentialStore;

use super::entity::credential::{self, Entity as CredentialEntity};

/// PostgreSQL credential store.
///
/// Duplicate prevention is the `credentials` primary key: two concurrent
/// inserts for one identifier cannot both commit.
pub struct PostgresCredentialStore {
    db: DbConn,
    closed: AtomicBool,
}

impl PostgresCredentialStore {
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

fn map_db_error(err: DbErr) -> StoreError {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return StoreError::Constraint("identifier already exists".to_string());
    }

    let message = err.to_string();
    // Mocked and proxied connections carry the server message as plain text.
    if message.contains("duplicate key") || message.contains("unique constraint") {
        return StoreError::Constraint("identifier already exists".to_string());
    }

    match err {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => StoreError::Connection(message),
        _ => StoreError::Query(message),
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn create(&self, credential: Credential) -> Result<(), StoreError> {
        self.ensure_open()?;
        tracing::debug!(
            identifier = %mask_identifier(&credential.identifier),
            "Inserting credential"
        );

        let model: credential::ActiveModel = credential.into();
        CredentialEntity::insert(model)
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Credential>, StoreError> {
        self.ensure_open()?;
        tracing::debug!(identifier = %mask_identifier(identifier), "Finding credential");

        let result = CredentialEntity::find_by_id(identifier.to_owned())
            .one(&self.db)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(Into::into))
    }

    async fn shutdown(&self) -> Result<(), StoreError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        self.db
            .close_by_ref()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        tracing::info!("Credential database connection closed");

        Ok(())
    }
}
