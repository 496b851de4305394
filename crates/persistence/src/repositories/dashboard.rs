//! Dashboard counters for managers and drivers.

use chrono::{DateTime, Utc};
use domain::models::{DriverDashboard, ManagerDashboard, OrderStatus};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::metrics::QueryTimer;

/// Order counters of a manager's restaurants (all restaurants when unscoped).
struct OrderCounters {
    total_orders: i64,
    pending_orders: i64,
    today_revenue: i64,
}

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Manager dashboard. `today` is the half-open `[start, end)` window of the current day.
    pub async fn manager_stats(
        &self,
        manager_id: Option<Uuid>,
        today: (DateTime<Utc>, DateTime<Utc>),
    ) -> Result<ManagerDashboard, sqlx::Error> {
        let timer = QueryTimer::new("manager_dashboard");
        let (orders, total_products) = tokio::try_join!(
            self.order_counters(manager_id, today),
            self.product_count(manager_id),
        )?;
        timer.record();

        Ok(ManagerDashboard {
            total_orders: orders.total_orders,
            pending_orders: orders.pending_orders,
            today_revenue: orders.today_revenue,
            total_products,
        })
    }

    async fn order_counters(
        &self,
        manager_id: Option<Uuid>,
        (start, end): (DateTime<Utc>, DateTime<Utc>),
    ) -> Result<OrderCounters, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_orders,
                COUNT(*) FILTER (WHERE o.status = ANY($2)) AS pending_orders,
                COALESCE(SUM(o.total) FILTER (WHERE o.created_at >= $3 AND o.created_at < $4), 0)::BIGINT
                    AS today_revenue
            FROM orders o
            JOIN restaurants r ON r.id = o.restaurant_id
            WHERE ($1::UUID IS NULL OR r.manager_id = $1)
            "#,
        )
        .bind(manager_id)
        .bind(OrderStatus::as_strs(&OrderStatus::IN_KITCHEN))
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(OrderCounters {
            total_orders: row.try_get("total_orders")?,
            pending_orders: row.try_get("pending_orders")?,
            today_revenue: row.try_get("today_revenue")?,
        })
    }

    async fn product_count(&self, manager_id: Option<Uuid>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM products p
            JOIN restaurants r ON r.id = p.restaurant_id
            WHERE ($1::UUID IS NULL OR r.manager_id = $1)
            "#,
        )
        .bind(manager_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Driver dashboard counters; `is_available` is filled in by the caller.
    pub async fn driver_stats(
        &self,
        driver_id: Uuid,
        (start, end): (DateTime<Utc>, DateTime<Utc>),
    ) -> Result<DriverDashboard, sqlx::Error> {
        let timer = QueryTimer::new("driver_dashboard");
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'delivered') AS total_deliveries,
                COUNT(*) FILTER (WHERE status = 'delivered' AND updated_at >= $2 AND updated_at < $3)
                    AS today_deliveries,
                COUNT(*) FILTER (WHERE status NOT IN ('delivered', 'cancelled')) AS pending_missions
            FROM orders
            WHERE driver_id = $1
            "#,
        )
        .bind(driver_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        timer.record();

        Ok(DriverDashboard {
            total_deliveries: row.try_get("total_deliveries")?,
            today_deliveries: row.try_get("today_deliveries")?,
            pending_missions: row.try_get("pending_missions")?,
            is_available: false,
        })
    }
}
