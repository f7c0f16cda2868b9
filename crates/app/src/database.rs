//! Database connection management

use sqlx::{PgPool, Postgres, Transaction, query};

/// Every unit of work runs at `SERIALIZABLE` so that read-check-write
/// sequences (stock reservation, status transitions) cannot interleave.
pub const SET_SERIALIZABLE_SQL: &str = "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE";

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a serializable transaction.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction or setting its isolation level fails.
    pub async fn begin_serializable(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        query(SET_SERIALIZABLE_SQL).execute(&mut *tx).await?;

        Ok(tx)
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}
