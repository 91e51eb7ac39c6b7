//! Schema setup for the items table

use sqlx::PgPool;

use super::DbError;

/// Create the items table if it does not exist.
///
/// Idempotent. Must complete before the server accepts connections.
pub async fn run(pool: &PgPool) -> Result<(), DbError> {
    tracing::info!("Running item migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            price DOUBLE PRECISION NOT NULL,
            category TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Item migrations complete");
    Ok(())
}
