//! Database module: connection pool, migrations, repositories.

pub mod repository;

use shared::error::AppError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Owns the connection pool shared by every repository.
#[derive(Clone)]
pub struct DbService {
    pub pool: PgPool,
}

impl DbService {
    pub async fn new(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(database_url)
            .await
            .map_err(|e| AppError::internal(format!("failed to open database: {e}")))?;

        tracing::info!("database connection pool established");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::internal(format!("failed to apply migrations: {e}")))?;
        tracing::info!("database migrations applied");

        Ok(Self { pool })
    }
}
