//! Application state - shared across all handlers.

use std::sync::Arc;

use anyhow::Context;
use sigil_core::ports::{CredentialStore, PasswordService, TokenService};
use sigil_core::{AuthFlow, AuthFlowConfig};
use sigil_infra::InMemoryCredentialStore;
use sigil_infra::auth::{Argon2PasswordService, JwtTokenService};

#[cfg(feature = "postgres")]
use migration::{Migrator, MigratorTrait};
#[cfg(feature = "postgres")]
use sigil_infra::database::{self, PostgresCredentialStore};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthFlow>,
    pub tokens: Arc<dyn TokenService>,
    pub store: Arc<dyn CredentialStore>,
}

impl AppState {
    /// Wire the configured implementations together.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let store = Self::build_store(config).await?;

        let passwords: Arc<dyn PasswordService> = Arc::new(
            Argon2PasswordService::new(config.argon2).context("invalid Argon2 parameters")?,
        );
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));

        tracing::info!(
            token_lifetime_secs = config.jwt.token_lifetime.num_seconds(),
            deadline_ms = config.auth.deadline.as_millis() as u64,
            "Application state initialized"
        );

        let state = Self::from_parts(store, passwords, tokens, config.auth.clone());
        state
            .auth
            .warm_up()
            .await
            .context("failed to prepare the signin decoy hash")?;

        Ok(state)
    }

    /// Assemble state from already-built ports.
    pub fn from_parts(
        store: Arc<dyn CredentialStore>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
        auth_config: AuthFlowConfig,
    ) -> Self {
        let auth = Arc::new(AuthFlow::new(
            Arc::clone(&store),
            passwords,
            Arc::clone(&tokens),
            auth_config,
        ));

        Self {
            auth,
            tokens,
            store,
        }
    }

    async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn CredentialStore>> {
        #[cfg(feature = "postgres")]
        if let Some(db_config) = &config.database {
            let conn = database::connect(db_config)
                .await
                .context("failed to connect to the credential database")?;

            if db_config.run_migrations {
                Migrator::up(&conn, None)
                    .await
                    .context("failed to apply credential migrations")?;
                tracing::info!("Credential migrations applied");
            }

            return Ok(Arc::new(PostgresCredentialStore::new(conn)));
        }

        #[cfg(not(feature = "postgres"))]
        let _ = config;

        tracing::warn!(
            "DATABASE_URL not set. Using the in-memory credential store; accounts are lost on restart."
        );
        Ok(Arc::new(InMemoryCredentialStore::new()))
    }
}
