//! Item repository
//!
//! Every call runs inside its own transaction. Dropping an uncommitted
//! transaction rolls it back and returns the connection to the pool, so
//! early returns and `?` release the session too.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Item, ItemPatch, NewItem};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Item repository
pub struct ItemRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ItemRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an item under a freshly generated id and return the stored row.
    pub async fn insert(&self, new: NewItem) -> Result<Item, DbError> {
        let id = Uuid::new_v4().to_string();
        let mut tx = self.pool.begin().await?;

        let item: Item = sqlx::query_as(
            r#"
            INSERT INTO items (id, name, description, price, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, price, category
            "#,
        )
        .bind(&id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(&new.category)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(id = %item.id, "item inserted");
        Ok(item)
    }

    /// List every item. Order is whatever the table scan yields.
    pub async fn list(&self) -> Result<Vec<Item>, DbError> {
        let mut tx = self.pool.begin().await?;

        let items: Vec<Item> =
            sqlx::query_as("SELECT id, name, description, price, category FROM items")
                .fetch_all(&mut *tx)
                .await?;

        tx.commit().await?;
        Ok(items)
    }

    /// Get a single item by id.
    ///
    /// Returns None if not found.
    pub async fn get(&self, id: &str) -> Result<Option<Item>, DbError> {
        let mut tx = self.pool.begin().await?;
        let item = fetch(&mut tx, id).await?;
        tx.commit().await?;
        Ok(item)
    }

    /// Apply a partial update.
    ///
    /// Only the supplied columns are written, so concurrent updates to
    /// different fields of the same row both survive. Returns None if not
    /// found, otherwise the full record after the write.
    pub async fn update(&self, id: &str, patch: ItemPatch) -> Result<Option<Item>, DbError> {
        let mut tx = self.pool.begin().await?;

        if patch.is_empty() {
            let item = fetch(&mut tx, id).await?;
            tx.commit().await?;
            return Ok(item);
        }

        let (set_description, description) = match patch.description {
            Some(description) => (true, description),
            None => (false, None),
        };

        let updated: Option<Item> = sqlx::query_as(
            r#"
            UPDATE items
            SET name = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                price = COALESCE($5, price),
                category = COALESCE($6, category)
            WHERE id = $1
            RETURNING id, name, description, price, category
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(set_description)
        .bind(&description)
        .bind(patch.price)
        .bind(&patch.category)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(updated) = updated else {
            return Ok(None);
        };

        tx.commit().await?;
        tracing::debug!(id = %updated.id, "item updated");
        Ok(Some(updated))
    }

    /// Delete an item.
    ///
    /// Returns false if no row had that id.
    pub async fn delete(&self, id: &str) -> Result<bool, DbError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        tx.commit().await?;
        tracing::debug!(id, "item deleted");
        Ok(true)
    }
}

async fn fetch(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: &str,
) -> Result<Option<Item>, sqlx::Error> {
    sqlx::query_as("SELECT id, name, description, price, category FROM items WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
}
