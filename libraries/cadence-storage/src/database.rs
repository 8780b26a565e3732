/// Database handle shared by the server
use cadence_core::{CadenceError, Result};
use sqlx::sqlite::SqlitePool;

/// Owns the connection pool. Queries live in the slice modules and take
/// `pool()` directly.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect and bring the schema up to date
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = crate::create_pool(database_url).await?;
        crate::run_migrations(&pool)
            .await
            .map_err(|e| CadenceError::storage(format!("Migration failed: {e}")))?;

        Ok(Self { pool })
    }

    /// Wrap an existing, already migrated pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
