use std::fmt;

#[cfg(feature = "config")]
use clap::Args;
use storyline_postgres::{PgClient, PgClientMigrationExt, PgConfig};

use crate::TRACING_TARGET_SERVICE;
use crate::service::{ServiceError, ServiceResult, SessionKeys};

/// Session token settings.
#[derive(Clone)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct SessionConfig {
    /// Shared secret used to sign and verify session tokens (at least 32 bytes)
    #[cfg_attr(feature = "config", arg(long = "session-secret", env = "SESSION_SECRET"))]
    pub session_secret: String,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("session_secret", &"[REDACTED]")
            .finish()
    }
}

/// Everything the [`ServiceState`] is built from.
///
/// [`ServiceState`]: crate::service::ServiceState
#[derive(Debug, Clone)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    #[cfg_attr(feature = "config", command(flatten))]
    pub postgres: PgConfig,

    #[cfg_attr(feature = "config", command(flatten))]
    pub session: SessionConfig,

    /// Apply pending database migrations at startup
    #[cfg_attr(
        feature = "config",
        arg(
            long = "run-migrations",
            env = "RUN_MIGRATIONS",
            default_value_t = true,
            action = clap::ArgAction::Set
        )
    )]
    pub run_migrations: bool,
}

impl ServiceConfig {
    pub fn new(postgres: PgConfig, session_secret: impl Into<String>) -> Self {
        Self {
            postgres,
            session: SessionConfig {
                session_secret: session_secret.into(),
            },
            run_migrations: true,
        }
    }

    /// Disables migrations at startup.
    pub fn without_migrations(mut self) -> Self {
        self.run_migrations = false;
        self
    }

    /// Validates the database settings and the session secret.
    pub fn validate(&self) -> ServiceResult<()> {
        self.postgres
            .validate()
            .map_err(|err| ServiceError::config(err.to_string()))?;
        SessionKeys::from_config(&self.session).map(|_| ())
    }

    /// Connects to the database and, if enabled, applies pending migrations.
    pub async fn connect_postgres(&self) -> ServiceResult<PgClient> {
        let pg_client = PgClient::connect(self.postgres.clone())
            .await
            .map_err(|err| ServiceError::database("Failed to connect to the database", err))?;

        if !self.run_migrations {
            tracing::info!(target: TRACING_TARGET_SERVICE, "Skipping database migrations");
            return Ok(pg_client);
        }

        let applied = pg_client
            .run_pending_migrations()
            .await
            .map_err(|err| ServiceError::database("Failed to apply database migrations", err))?;

        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            applied = applied.len(),
            "Database migrations are up to date"
        );

        Ok(pg_client)
    }

    pub fn load_session_keys(&self) -> ServiceResult<SessionKeys> {
        SessionKeys::from_config(&self.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "storyline-session-secret-for-tests";

    #[test]
    fn valid_config_passes() {
        let config = ServiceConfig::new(
            PgConfig::new("postgresql://storyline@localhost/storyline"),
            SECRET,
        );
        assert!(config.validate().is_ok());
        assert!(config.run_migrations);
        assert!(!config.without_migrations().run_migrations);
    }

    #[test]
    fn short_secret_fails_validation() {
        let config = ServiceConfig::new(
            PgConfig::new("postgresql://storyline@localhost/storyline"),
            "short",
        );
        assert!(matches!(config.validate(), Err(ServiceError::Config(_))));
    }

    #[test]
    fn debug_redacts_the_secret() {
        let config = SessionConfig {
            session_secret: SECRET.to_owned(),
        };
        assert!(!format!("{config:?}").contains(SECRET));
    }
}
