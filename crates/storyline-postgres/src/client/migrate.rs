//! Embedded schema migrations.
//!
//! Diesel's migration harness is synchronous, so it runs on a blocking task
//! over an [`AsyncConnectionWrapper`] around a pooled connection.

use std::future::Future;
use std::time::Instant;

use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::MigrationHarness;
use tokio::task::spawn_blocking;

use crate::error::BoxError;
use crate::{MIGRATIONS, PgClient, PgError, PgResult, PooledConnection, TRACING_TARGET_MIGRATION};

type MigrationConnection = AsyncConnectionWrapper<PooledConnection>;

/// Applied and pending migration versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Applied migration versions, oldest first.
    pub applied_versions: Vec<String>,
    /// Embedded migration versions not yet applied, oldest first.
    pub pending_versions: Vec<String>,
}

impl MigrationStatus {
    /// Returns the last applied migration version, if any.
    pub fn last_applied_version(&self) -> Option<&str> {
        self.applied_versions.last().map(String::as_str)
    }

    /// Returns the next pending migration version, if any.
    pub fn next_pending_version(&self) -> Option<&str> {
        self.pending_versions.first().map(String::as_str)
    }

    /// Returns true if all embedded migrations have been applied.
    #[inline]
    pub fn is_up_to_date(&self) -> bool {
        self.pending_versions.is_empty()
    }
}

/// Migration operations on [`PgClient`].
pub trait PgClientMigrationExt {
    /// Applies every pending embedded migration and returns their versions.
    ///
    /// Calling it on an up-to-date database is a no-op.
    fn run_pending_migrations(&self) -> impl Future<Output = PgResult<Vec<String>>> + Send;

    /// Reports which embedded migrations are applied and which are pending.
    fn migration_status(&self) -> impl Future<Output = PgResult<MigrationStatus>> + Send;
}

impl PgClientMigrationExt for PgClient {
    #[tracing::instrument(skip(self), target = TRACING_TARGET_MIGRATION)]
    async fn run_pending_migrations(&self) -> PgResult<Vec<String>> {
        let start = Instant::now();
        let conn = self.get_pooled_connection().await?;

        let versions = with_harness(conn, |harness| {
            let versions = harness.run_pending_migrations(MIGRATIONS)?;
            Ok(versions.iter().map(ToString::to_string).collect::<Vec<_>>())
        })
        .await
        .inspect_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_MIGRATION,
                error = %err,
                elapsed = ?start.elapsed(),
                "Database migration failed"
            );
        })?;

        if versions.is_empty() {
            tracing::info!(target: TRACING_TARGET_MIGRATION, "Database schema is up to date");
        } else {
            tracing::info!(
                target: TRACING_TARGET_MIGRATION,
                applied = ?versions,
                elapsed = ?start.elapsed(),
                "Applied pending migrations"
            );
        }

        Ok(versions)
    }

    #[tracing::instrument(skip(self), target = TRACING_TARGET_MIGRATION)]
    async fn migration_status(&self) -> PgResult<MigrationStatus> {
        let conn = self.get_pooled_connection().await?;

        let status = with_harness(conn, |harness| {
            let mut applied_versions: Vec<String> = harness
                .applied_migrations()?
                .iter()
                .map(ToString::to_string)
                .collect();
            applied_versions.sort();

            let pending_versions = harness
                .pending_migrations(MIGRATIONS)?
                .iter()
                .map(|migration| migration.name().version().to_string())
                .collect();

            Ok(MigrationStatus {
                applied_versions,
                pending_versions,
            })
        })
        .await?;

        tracing::debug!(
            target: TRACING_TARGET_MIGRATION,
            applied = status.applied_versions.len(),
            pending = status.pending_versions.len(),
            "Migration status retrieved"
        );

        Ok(status)
    }
}

/// Runs `f` against a blocking migration harness.
async fn with_harness<T, F>(conn: PooledConnection, f: F) -> PgResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut MigrationConnection) -> Result<T, BoxError> + Send + 'static,
{
    let mut harness = MigrationConnection::from(conn);
    spawn_blocking(move || f(&mut harness))
        .await
        .map_err(|err| PgError::Migration(err.into()))?
        .map_err(PgError::Migration)
}
