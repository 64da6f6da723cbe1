//! Postgres-backed document store.
//!
//! One pool is opened at startup and handed to every handler through the
//! router state. Cities embed their sights as a JSONB array; every mutation
//! of that array is a single atomic statement, so the conditional-push
//! duplicate guard needs no application-level locking.

pub mod cities;
pub mod sights;
pub mod users;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;

/// Errors from the store layer. Absence is expressed as `Option`/empty
/// results, not as an error; the unique-key violation is the one business
/// failure that is raised, to be translated into a Conflict at the boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key")]
    Duplicate,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Postgres unique_violation
const UNIQUE_VIOLATION: &str = "23505";

pub(crate) fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return StoreError::Duplicate;
        }
    }
    StoreError::Sqlx(err)
}

/// Open the process-wide connection pool.
pub async fn connect(config: &AppConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    info!("created database pool");
    Ok(pool)
}

/// Connectivity check used by the health endpoint.
pub async fn ping(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
