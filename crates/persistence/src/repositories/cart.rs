//! Cart repository.
//!
//! Every mutation runs in a transaction that first touches the cart row, so
//! it serializes with checkout, which locks the same row.

use domain::models::cart::MAX_LINE_QUANTITY;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{CartEntity, CartLineEntity};
use crate::metrics::QueryTimer;

async fn touch_cart(conn: &mut PgConnection, cart_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE carts SET updated_at = NOW() WHERE id = $1")
        .bind(cart_id)
        .execute(conn)
        .await?;
    Ok(())
}

#[derive(Clone)]
pub struct CartRepository {
    pool: PgPool,
}

impl CartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the user's cart, creating it on first use.
    pub async fn get_or_create(&self, user_id: Uuid) -> Result<CartEntity, sqlx::Error> {
        let timer = QueryTimer::new("get_or_create_cart");
        let result = sqlx::query_as::<_, CartEntity>(
            r#"
            INSERT INTO carts (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id, user_id, updated_at
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Lines with their current product, in insertion order.
    pub async fn lines(&self, cart_id: i64) -> Result<Vec<CartLineEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_cart_lines");
        let result = sqlx::query_as::<_, CartLineEntity>(
            r#"
            SELECT ci.id AS line_id, ci.quantity, p.id AS product_id, p.restaurant_id,
                   r.name AS restaurant_name, r.manager_id AS restaurant_manager_id,
                   r.is_active AS restaurant_is_active, p.category_id, c.name AS category_name,
                   p.name, p.description, p.price, p.image, p.is_available, p.is_popular, p.is_featured, p.created_at
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            JOIN restaurants r ON r.id = p.restaurant_id
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE ci.cart_id = $1
            ORDER BY ci.id
            "#,
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Add a product, incrementing the existing line if there is one. The
    /// merged quantity is capped at [`MAX_LINE_QUANTITY`].
    pub async fn add_item(
        &self,
        cart_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("add_cart_item");
        let mut tx = self.pool.begin().await?;
        touch_cart(&mut *tx, cart_id).await?;

        sqlx::query(
            r#"
            INSERT INTO cart_items (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = LEAST(cart_items.quantity + EXCLUDED.quantity, $4)
            "#,
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .bind(MAX_LINE_QUANTITY)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(())
    }

    /// Set a line's quantity; zero or less removes it.
    ///
    /// Returns false when the product is not in the cart.
    pub async fn set_quantity(
        &self,
        cart_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("set_cart_item_quantity");
        let mut tx = self.pool.begin().await?;
        touch_cart(&mut *tx, cart_id).await?;

        let result = if quantity <= 0 {
            sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
                .bind(cart_id)
                .bind(product_id)
                .execute(&mut *tx)
                .await?
        } else {
            sqlx::query(
                "UPDATE cart_items SET quantity = $3 WHERE cart_id = $1 AND product_id = $2",
            )
            .bind(cart_id)
            .bind(product_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?
        };

        let found = result.rows_affected() > 0;
        if found {
            tx.commit().await?;
        } else {
            tx.rollback().await?;
        }
        timer.record();
        Ok(found)
    }

    /// Remove one product's line. Removing an absent line is not an error.
    pub async fn remove_item(&self, cart_id: i64, product_id: i64) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("remove_cart_item");
        let mut tx = self.pool.begin().await?;
        touch_cart(&mut *tx, cart_id).await?;

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        timer.record();
        Ok(())
    }

    /// Remove every line.
    pub async fn clear(&self, cart_id: i64) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("clear_cart");
        let mut tx = self.pool.begin().await?;
        touch_cart(&mut *tx, cart_id).await?;

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        timer.record();
        Ok(())
    }

    /// Re-read the cart header (for a fresh `updated_at`).
    pub async fn find(&self, cart_id: i64) -> Result<Option<CartEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_cart");
        let result = sqlx::query_as::<_, CartEntity>(
            "SELECT id, user_id, updated_at FROM carts WHERE id = $1",
        )
        .bind(cart_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
