//! Embedded migration runner.

use std::time::{Duration, Instant};

use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use diesel_migrations::MigrationHarness;
use tokio::task::spawn_blocking;

use crate::{MIGRATIONS, PgClient, PgError, PgResult, TRACING_TARGET_MIGRATION};

/// Outcome of a migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationResult {
    /// Wall-clock time spent applying migrations.
    pub duration: Duration,
    /// Versions applied by this run, oldest first.
    pub processed_versions: Vec<String>,
}

impl MigrationResult {
    /// Returns whether the schema was already up to date.
    pub fn is_no_op(&self) -> bool {
        self.processed_versions.is_empty()
    }
}

/// Applies every embedded migration that has not been applied yet.
///
/// Diesel's harness is synchronous, so the run happens on a blocking thread
/// through [`AsyncConnectionWrapper`].
#[tracing::instrument(skip(pg), target = TRACING_TARGET_MIGRATION)]
pub async fn run_pending_migrations(pg: &PgClient) -> PgResult<MigrationResult> {
    let start = Instant::now();
    let conn = pg.get_pooled_connection().await?;
    let mut conn: AsyncConnectionWrapper<_> = conn.into();

    let versions = spawn_blocking(move || {
        conn.run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.into_iter().map(|v| v.to_string()).collect::<Vec<_>>())
    })
    .await
    .map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_MIGRATION,
            error = %err,
            "Migration task panicked"
        );
        PgError::Migration(err.into())
    })?
    .map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_MIGRATION,
            error = %err,
            "Database migration failed"
        );
        PgError::Migration(err)
    })?;

    let result = MigrationResult {
        duration: start.elapsed(),
        processed_versions: versions,
    };

    tracing::info!(
        target: TRACING_TARGET_MIGRATION,
        duration = ?result.duration,
        migrations_count = result.processed_versions.len(),
        "Database migrations applied"
    );

    Ok(result)
}

/// Returns the applied migration versions in order.
#[tracing::instrument(skip(conn), target = TRACING_TARGET_MIGRATION)]
pub async fn get_applied_migrations(conn: &mut AsyncPgConnection) -> PgResult<Vec<String>> {
    #[derive(diesel::QueryableByName)]
    struct MigrationVersion {
        #[diesel(sql_type = diesel::sql_types::Text)]
        version: String,
    }

    let versions = diesel::sql_query(
        "SELECT version FROM __diesel_schema_migrations ORDER BY version",
    )
    .get_results::<MigrationVersion>(conn)
    .await
    .map_err(|e| PgError::Migration(format!("Failed to read applied migrations: {e}").into()))?
    .into_iter()
    .map(|row| row.version)
    .collect();

    Ok(versions)
}

/// Migration helpers available directly on [`PgClient`].
pub trait PgClientMigrationExt {
    /// Applies pending migrations. Safe to call on every startup.
    fn run_pending_migrations(&self) -> impl Future<Output = PgResult<MigrationResult>> + Send;

    /// Returns the applied migration versions.
    fn get_applied_migrations(&self) -> impl Future<Output = PgResult<Vec<String>>> + Send;
}

impl PgClientMigrationExt for PgClient {
    async fn run_pending_migrations(&self) -> PgResult<MigrationResult> {
        run_pending_migrations(self).await
    }

    async fn get_applied_migrations(&self) -> PgResult<Vec<String>> {
        let mut conn = self.get_connection().await?;
        get_applied_migrations(&mut conn).await
    }
}
