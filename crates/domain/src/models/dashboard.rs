//! Dashboard counters for managers and drivers.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ManagerDashboard {
    pub total_orders: i64,
    /// Orders still pending, accepted or preparing
    pub pending_orders: i64,
    /// Sum of order totals created today (server-local calendar day)
    pub today_revenue: i64,
    pub total_products: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DriverDashboard {
    pub total_deliveries: i64,
    pub today_deliveries: i64,
    /// Assigned orders that are neither delivered nor cancelled
    pub pending_missions: i64,
    pub is_available: bool,
}
