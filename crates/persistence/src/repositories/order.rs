//! Order repository, including the checkout transaction.

use domain::models::order::CreateOrderRequest;
use domain::models::{Order, OrderItem, OrderStatus};
use domain::services::checkout::{build_order_draft, CheckoutError, CheckoutLine};
use domain::services::OrderScope;
use sqlx::PgPool;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{CheckoutLineEntity, OrderEntity, OrderItemEntity};
use crate::metrics::QueryTimer;

const ORDER_SELECT: &str = r#"
    SELECT o.id, o.user_id, o.restaurant_id, r.name AS restaurant_name,
           r.image AS restaurant_image, r.manager_id AS restaurant_manager_id, o.driver_id,
           CASE WHEN d.id IS NULL THEN NULL
                ELSE COALESCE(NULLIF(TRIM(d.first_name || ' ' || d.last_name), ''), d.username)
           END AS driver_name,
           o.status, o.total, o.delivery_fee, o.delivery_address, o.customer_name,
           o.customer_phone, o.notes, o.created_at, o.updated_at
    FROM orders o
    JOIN restaurants r ON r.id = o.restaurant_id
    LEFT JOIN users d ON d.id = o.driver_id
"#;

/// Checkout failed either on the cart contents or in the database.
#[derive(Debug, Error)]
pub enum CheckoutFailure {
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Column filters equivalent to an [`OrderScope`].
fn scope_binds(scope: OrderScope) -> (Option<Uuid>, Option<Uuid>, Option<Uuid>) {
    match scope {
        OrderScope::All => (None, None, None),
        OrderScope::ManagedBy(id) => (Some(id), None, None),
        OrderScope::AssignedTo(id) => (None, Some(id), None),
        OrderScope::PlacedBy(id) => (None, None, Some(id)),
    }
}

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Turn the user's cart into an order and empty the cart.
    ///
    /// The cart row stays locked for the whole transaction. Returns the new order id.
    pub async fn create_from_cart(
        &self,
        user_id: Uuid,
        details: &CreateOrderRequest,
    ) -> Result<i64, CheckoutFailure> {
        let timer = QueryTimer::new("create_order_from_cart");
        let mut tx = self.pool.begin().await?;

        let cart_id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM carts WHERE user_id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        let cart_id = cart_id.ok_or(CheckoutError::EmptyCart)?;

        let lines: Vec<CheckoutLine> = sqlx::query_as::<_, CheckoutLineEntity>(
            r#"
            SELECT p.id AS product_id, p.restaurant_id, p.name AS product_name,
                   p.price AS unit_price, ci.quantity
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.cart_id = $1
            ORDER BY ci.id
            "#,
        )
        .bind(cart_id)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(CheckoutLine::from)
        .collect();

        let draft = build_order_draft(&lines)?;
        if draft.spans_multiple_restaurants {
            tracing::warn!(
                user_id = %user_id,
                restaurant_id = draft.restaurant_id,
                "Cart spans several restaurants; order attributed to the first"
            );
        }

        let order_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO orders (user_id, restaurant_id, status, total, delivery_fee,
                                delivery_address, customer_name, customer_phone, notes)
            SELECT $1, r.id, 'pending', $3, r.delivery_fee, $4, $5, $6, $7
            FROM restaurants r
            WHERE r.id = $2
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(draft.restaurant_id)
        .bind(draft.total)
        .bind(details.delivery_address.trim())
        .bind(details.customer_name.trim())
        .bind(details.customer_phone.trim())
        .bind(&details.notes)
        .fetch_one(&mut *tx)
        .await?;

        for line in &draft.lines {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, product_name, product_price, quantity)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(line.product_price)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE carts SET updated_at = NOW() WHERE id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        timer.record();
        Ok(order_id)
    }

    /// Orders in scope, newest first, optionally restricted to some statuses.
    pub async fn list(
        &self,
        scope: OrderScope,
        statuses: Option<&[OrderStatus]>,
    ) -> Result<Vec<OrderEntity>, sqlx::Error> {
        let (manager_id, driver_id, customer_id) = scope_binds(scope);
        let timer = QueryTimer::new("list_orders");
        let sql = format!(
            "{} WHERE ($1::UUID IS NULL OR r.manager_id = $1)
                AND ($2::UUID IS NULL OR o.driver_id = $2)
                AND ($3::UUID IS NULL OR o.user_id = $3)
                AND ($4::TEXT[] IS NULL OR o.status = ANY($4))
              ORDER BY o.created_at DESC, o.id DESC",
            ORDER_SELECT
        );
        let result = sqlx::query_as::<_, OrderEntity>(&sql)
            .bind(manager_id)
            .bind(driver_id)
            .bind(customer_id)
            .bind(statuses.map(OrderStatus::as_strs))
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Find an order regardless of scope; callers check visibility.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<OrderEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_order_by_id");
        let sql = format!("{} WHERE o.id = $1", ORDER_SELECT);
        let result = sqlx::query_as::<_, OrderEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Orders assigned to the driver plus ready orders nobody has taken.
    pub async fn list_missions(&self, driver_id: Uuid) -> Result<Vec<OrderEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_driver_missions");
        let sql = format!(
            "{} WHERE o.driver_id = $1 OR (o.driver_id IS NULL AND o.status = 'ready')
              ORDER BY o.created_at DESC, o.id DESC",
            ORDER_SELECT
        );
        let result = sqlx::query_as::<_, OrderEntity>(&sql)
            .bind(driver_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Store a new status and driver. Last write wins.
    pub async fn apply_change(
        &self,
        id: i64,
        status: OrderStatus,
        driver_id: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("update_order_status");
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = $2, driver_id = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(driver_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    pub async fn bulk_set_status(
        &self,
        ids: &[i64],
        status: OrderStatus,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("bulk_set_order_status");
        let result = sqlx::query(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = ANY($1)",
        )
        .bind(ids)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Line items for a set of orders.
    pub async fn items_for(&self, order_ids: &[i64]) -> Result<Vec<OrderItemEntity>, sqlx::Error> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }
        let timer = QueryTimer::new("list_order_items");
        let result = sqlx::query_as::<_, OrderItemEntity>(
            r#"
            SELECT id, order_id, product_id, product_name, product_price, quantity
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, id
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Attach line items to order rows, keeping the row order.
    pub async fn hydrate(&self, entities: Vec<OrderEntity>) -> Result<Vec<Order>, sqlx::Error> {
        let ids: Vec<i64> = entities.iter().map(|o| o.id).collect();
        let mut items: HashMap<i64, Vec<OrderItem>> = HashMap::new();
        for item in self.items_for(&ids).await? {
            items
                .entry(item.order_id)
                .or_default()
                .push(OrderItem::from(item));
        }

        Ok(entities
            .into_iter()
            .map(|entity| {
                let lines = items.remove(&entity.id).unwrap_or_default();
                entity.into_order(lines)
            })
            .collect())
    }

    /// Find an order with its items.
    pub async fn find_with_items(&self, id: i64) -> Result<Option<Order>, sqlx::Error> {
        match self.find_by_id(id).await? {
            Some(entity) => Ok(self.hydrate(vec![entity]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_binds_use_one_column() {
        let id = Uuid::new_v4();
        assert_eq!(scope_binds(OrderScope::All), (None, None, None));
        assert_eq!(scope_binds(OrderScope::ManagedBy(id)), (Some(id), None, None));
        assert_eq!(scope_binds(OrderScope::AssignedTo(id)), (None, Some(id), None));
        assert_eq!(scope_binds(OrderScope::PlacedBy(id)), (None, None, Some(id)));
    }
}
