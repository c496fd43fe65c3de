//! # Cart Item Repository
//!
//! Database operations for persisted cart lines.
//!
//! ## Cart Item Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Cart Item Lifecycle                                 │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── insert() → CartLineItem { id: <rowid> }                        │
//! │                                                                         │
//! │  2. READ                                                               │
//! │     └── list() / list_for_user() / get_by_id()                         │
//! │                                                                         │
//! │  3. EDIT                                                               │
//! │     └── update() → NotFound when the id is gone                        │
//! │                                                                         │
//! │  4. DELETE                                                             │
//! │     └── delete() → missing id is a no-op                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use basket_core::CartLineItem;

/// Repository for cart item database operations.
#[derive(Debug, Clone)]
pub struct CartItemRepository {
    pool: SqlitePool,
}

impl CartItemRepository {
    /// Creates a new CartItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartItemRepository { pool }
    }

    /// Lists every cart item in insertion order.
    pub async fn list(&self) -> DbResult<Vec<CartLineItem>> {
        let items = sqlx::query_as::<_, CartLineItem>(
            r#"
            SELECT id, user_id, item_name, unit_price_cents, quantity
            FROM cart_items
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists one user's cart items in insertion order.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<CartLineItem>> {
        let items = sqlx::query_as::<_, CartLineItem>(
            r#"
            SELECT id, user_id, item_name, unit_price_cents, quantity
            FROM cart_items
            WHERE user_id = ?1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets a cart item by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<CartLineItem>> {
        let item = sqlx::query_as::<_, CartLineItem>(
            r#"
            SELECT id, user_id, item_name, unit_price_cents, quantity
            FROM cart_items
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Inserts a cart item. The `id` on the argument is ignored.
    ///
    /// ## Returns
    /// The stored item carrying its generated id.
    pub async fn insert(&self, item: &CartLineItem) -> DbResult<CartLineItem> {
        debug!(user_id = %item.user_id, item = %item.item_name, "Inserting cart item");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO cart_items (
                user_id, item_name, unit_price_cents, quantity, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
        )
        .bind(&item.user_id)
        .bind(&item.item_name)
        .bind(item.unit_price_cents)
        .bind(item.quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(CartLineItem {
            id: result.last_insert_rowid(),
            ..item.clone()
        })
    }

    /// Updates an existing cart item.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - No row with this id
    pub async fn update(&self, item: &CartLineItem) -> DbResult<()> {
        debug!(id = item.id, "Updating cart item");

        let result = sqlx::query(
            r#"
            UPDATE cart_items SET
                user_id = ?2,
                item_name = ?3,
                unit_price_cents = ?4,
                quantity = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(item.id)
        .bind(&item.user_id)
        .bind(&item.item_name)
        .bind(item.unit_price_cents)
        .bind(item.quantity)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CartItem", item.id.to_string()));
        }

        Ok(())
    }

    /// Deletes a cart item. Deleting a missing id is not an error.
    ///
    /// ## Returns
    /// Whether a row was removed.
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        debug!(id, "Deleting cart item");

        let result = sqlx::query("DELETE FROM cart_items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether a cart item with this id exists.
    pub async fn exists(&self, id: i64) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM cart_items WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }
}
