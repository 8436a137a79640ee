//! Database connection management

use std::{num::TryFromIntError, time::Duration};

use sqlx::{PgPool, Row, migrate::MigrateError, postgres::PgPoolOptions, postgres::PgRow};

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Connect to `PostgreSQL`, waiting at most `acquire_timeout` for a connection.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str, acquire_timeout: Duration) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await
}

/// Apply the embedded schema migrations.
///
/// # Errors
///
/// Returns an error if a migration fails or the recorded history diverges.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// Read a `BIGINT` column into an unsigned model field.
pub(crate) fn try_get_unsigned<T>(row: &PgRow, col: &str) -> Result<T, sqlx::Error>
where
    T: TryFrom<i64, Error = TryFromIntError>,
{
    let value: i64 = row.try_get(col)?;

    T::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}
