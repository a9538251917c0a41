//! Shared `PostgreSQL` plumbing for the persistence adapters.
//!
//! Adapters hold a clone of the same r2d2 pool and move every Diesel call
//! onto the blocking thread pool.

pub(crate) mod schema;

use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use thiserror::Error;

/// `PostgreSQL` connection pool type used by all adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Schema bootstrap applied at startup. Every statement is idempotent.
pub const CREATE_TABLES_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_task_tables/up.sql");

/// Errors raised while preparing the database.
#[derive(Debug, Error)]
pub enum PostgresSetupError {
    /// The connection pool could not be built.
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] PoolError),

    /// The schema bootstrap failed.
    #[error("failed to apply schema: {0}")]
    Schema(#[from] diesel::result::Error),

    /// The blocking setup task did not complete.
    #[error("schema bootstrap task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Builds a connection pool for the given database URL.
///
/// # Errors
///
/// Returns [`PostgresSetupError::Pool`] when no connection can be established.
pub fn build_pool(database_url: &str, max_size: u32) -> Result<PgPool, PostgresSetupError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Ok(Pool::builder().max_size(max_size).build(manager)?)
}

/// Creates any missing tables and indexes.
///
/// # Errors
///
/// Returns [`PostgresSetupError`] when a connection cannot be checked out or
/// a statement fails.
pub async fn apply_schema(pool: &PgPool) -> Result<(), PostgresSetupError> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = pool.get()?;
        connection.batch_execute(CREATE_TABLES_SQL)?;
        Ok(())
    })
    .await?
}
