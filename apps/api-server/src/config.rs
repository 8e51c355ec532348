//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use sigil_core::AuthFlowConfig;
use sigil_infra::auth::{Argon2Config, JwtConfig};

#[cfg(feature = "postgres")]
use sigil_infra::database::DatabaseConfig;

/// Configuration errors surfaced at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("JWT_SECRET must be set when RUST_ENV is production")]
    MissingSecret,
}

/// Longest accepted token lifetime: 30 days.
const MAX_TOKEN_LIFETIME_SECS: i64 = 30 * 24 * 60 * 60;
const LIFETIME_EXPECTED: &str = "between 1 and 2592000 seconds";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub argon2: Argon2Config,
    pub auth: AuthFlowConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let production = matches!(
            lookup("RUST_ENV").as_deref(),
            Some("production") | Some("prod")
        );

        #[cfg(feature = "postgres")]
        let database = match lookup("DATABASE_URL").filter(|url| !url.is_empty()) {
            Some(url) => {
                let defaults = DatabaseConfig::new(url.clone());
                Some(DatabaseConfig {
                    url,
                    max_connections: parse(
                        &lookup,
                        "DB_MAX_CONNECTIONS",
                        defaults.max_connections,
                        "a positive integer",
                    )?,
                    min_connections: parse(
                        &lookup,
                        "DB_MIN_CONNECTIONS",
                        defaults.min_connections,
                        "a non-negative integer",
                    )?,
                    run_migrations: parse(
                        &lookup,
                        "DB_RUN_MIGRATIONS",
                        defaults.run_migrations,
                        "true or false",
                    )?,
                })
            }
            None => None,
        };

        let lifetime_secs: i64 = parse(
            &lookup,
            "JWT_TOKEN_LIFETIME_SECS",
            3600,
            LIFETIME_EXPECTED,
        )?;
        let lifetime = Some(lifetime_secs)
            .filter(|secs| (1..=MAX_TOKEN_LIFETIME_SECS).contains(secs))
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(|| ConfigError::Invalid {
                key: "JWT_TOKEN_LIFETIME_SECS",
                value: lifetime_secs.to_string(),
                expected: LIFETIME_EXPECTED,
            })?;

        let jwt = signing_config(&lookup, production)?
            .with_lifetime(lifetime)
            .with_issuer(
                lookup("JWT_ISSUER").unwrap_or_else(|| JwtConfig::DEFAULT_ISSUER.to_string()),
            );

        let argon2_defaults = Argon2Config::default();
        let argon2 = Argon2Config {
            memory_kib: parse(
                &lookup,
                "ARGON2_MEMORY_KIB",
                argon2_defaults.memory_kib,
                "a memory cost in KiB",
            )?,
            iterations: parse(
                &lookup,
                "ARGON2_ITERATIONS",
                argon2_defaults.iterations,
                "an iteration count",
            )?,
            parallelism: parse(
                &lookup,
                "ARGON2_PARALLELISM",
                argon2_defaults.parallelism,
                "a lane count",
            )?,
        };

        let deadline_secs: u64 = parse(
            &lookup,
            "AUTH_DEADLINE_SECS",
            AuthFlowConfig::default().deadline.as_secs(),
            "a positive number of seconds",
        )?;
        if deadline_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "AUTH_DEADLINE_SECS",
                value: deadline_secs.to_string(),
                expected: "a positive number of seconds",
            });
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse(&lookup, "PORT", 8080, "a TCP port")?,
            #[cfg(feature = "postgres")]
            database,
            jwt,
            argon2,
            auth: AuthFlowConfig {
                deadline: Duration::from_secs(deadline_secs),
            },
        })
    }
}

/// The signing key is injected through `JWT_SECRET`. Outside production a
/// missing key falls back to a random per-process key.
fn signing_config<F>(lookup: &F, production: bool) -> Result<JwtConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup("JWT_SECRET").filter(|secret| !secret.is_empty()) {
        Some(secret) => {
            if secret.len() < 32 {
                tracing::warn!("JWT_SECRET is shorter than 32 bytes; use a longer random key.");
            }
            Ok(JwtConfig::new(secret.into_bytes()))
        }
        None if production => {
            tracing::error!("SECURITY: JWT_SECRET is not set in production.");
            Err(ConfigError::MissingSecret)
        }
        None => {
            tracing::warn!(
                "JWT_SECRET not set. Using a random per-process key; tokens will not survive a restart."
            );
            Ok(JwtConfig::ephemeral())
        }
    }
}

fn parse<F, T>(lookup: &F, key: &'static str, default: T, expected: &'static str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            value,
            expected,
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.jwt.token_lifetime, TimeDelta::hours(1));
        assert_eq!(config.jwt.issuer, "sigil");
        assert_eq!(config.jwt.secret.len(), 32);
        assert_eq!(config.auth.deadline, Duration::from_secs(5));
        assert_eq!(config.argon2, Argon2Config::default());
        #[cfg(feature = "postgres")]
        assert!(config.database.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("JWT_SECRET", "0123456789abcdef0123456789abcdef"),
            ("JWT_TOKEN_LIFETIME_SECS", "900"),
            ("JWT_ISSUER", "sigil-test"),
            ("AUTH_DEADLINE_SECS", "2"),
            ("ARGON2_MEMORY_KIB", "4096"),
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.jwt.secret, b"0123456789abcdef0123456789abcdef".to_vec());
        assert_eq!(config.jwt.token_lifetime, TimeDelta::minutes(15));
        assert_eq!(config.jwt.issuer, "sigil-test");
        assert_eq!(config.auth.deadline, Duration::from_secs(2));
        assert_eq!(config.argon2.memory_kib, 4096);
    }

    #[test]
    fn test_production_requires_secret() {
        let result = config_from(&[("RUST_ENV", "production")]);
        assert!(matches!(result, Err(ConfigError::MissingSecret)));

        let result = config_from(&[("RUST_ENV", "prod"), ("JWT_SECRET", "")]);
        assert!(matches!(result, Err(ConfigError::MissingSecret)));
    }

    #[test]
    fn test_invalid_numbers_are_errors() {
        let result = config_from(&[("PORT", "eighty")]);
        assert!(matches!(result, Err(ConfigError::Invalid { key: "PORT", .. })));

        let result = config_from(&[("JWT_TOKEN_LIFETIME_SECS", "0")]);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                key: "JWT_TOKEN_LIFETIME_SECS",
                ..
            })
        ));
    }

    #[test]
    fn test_lifetime_out_of_range_is_error() {
        for value in ["-5", "2592001", "10000000000000000"] {
            let result = config_from(&[("JWT_TOKEN_LIFETIME_SECS", value)]);
            assert!(
                matches!(
                    result,
                    Err(ConfigError::Invalid {
                        key: "JWT_TOKEN_LIFETIME_SECS",
                        ..
                    })
                ),
                "{value} was accepted"
            );
        }

        let config = config_from(&[("JWT_TOKEN_LIFETIME_SECS", "2592000")]).unwrap();
        assert_eq!(config.jwt.token_lifetime, TimeDelta::days(30));
    }

    #[test]
    fn test_zero_deadline_is_error() {
        let result = config_from(&[("AUTH_DEADLINE_SECS", "0")]);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                key: "AUTH_DEADLINE_SECS",
                ..
            })
        ));
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn test_database_config() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/sigil"),
            ("DB_MAX_CONNECTIONS", "50"),
            ("DB_RUN_MIGRATIONS", "false"),
        ])
        .unwrap();

        let database = config.database.unwrap();
        assert_eq!(database.url, "postgres://localhost/sigil");
        assert_eq!(database.max_connections, 50);
        assert_eq!(database.min_connections, 2);
        assert!(!database.run_migrations);
    }
}
