//! Order routes: checkout, role-scoped listings and status updates.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::order::{CreateOrderRequest, OrderResponse, UpdateOrderStatusRequest};
use domain::models::{Order, OrderStatus};
use domain::services::access::resolve_order_change;
use domain::services::OrderScope;
use persistence::repositories::{OrderRepository, UserRepository};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppJson, CurrentUser};
use crate::middleware::metrics::{record_order_created, record_order_status_change};

fn not_found() -> ApiError {
    ApiError::NotFound("Order not found".to_string())
}

pub(crate) fn render(state: &AppState, orders: &[Order]) -> Vec<OrderResponse> {
    orders
        .iter()
        .map(|o| o.to_response(state.media_base_url()))
        .collect()
}

async fn scoped_list(
    state: &AppState,
    user: &CurrentUser,
    statuses: Option<&[OrderStatus]>,
) -> Result<Vec<OrderResponse>, ApiError> {
    let repo = OrderRepository::new(state.pool.clone());
    let scope = OrderScope::for_caller(&user.caller());
    let orders = repo.hydrate(repo.list(scope, statuses).await?).await?;
    Ok(render(state, &orders))
}

/// Orders visible to the caller, newest first.
///
/// GET /api/v1/orders
pub async fn list_orders(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    Ok(Json(scoped_list(&state, &user, None).await?))
}

/// Visible orders not yet handed to a driver.
///
/// GET /api/v1/orders/pending
pub async fn pending_orders(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    Ok(Json(
        scoped_list(&state, &user, Some(&OrderStatus::AWAITING_DISPATCH)).await?,
    ))
}

/// GET /api/v1/orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = OrderRepository::new(state.pool.clone())
        .find_with_items(id)
        .await?
        .ok_or_else(not_found)?;

    if !OrderScope::for_caller(&user.caller()).contains(&order) {
        return Err(not_found());
    }

    Ok(Json(order.to_response(state.media_base_url())))
}

/// Checks out the caller's cart.
///
/// POST /api/v1/orders/create_from_cart
pub async fn create_from_cart(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(request): AppJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    request.validate()?;

    let repo = OrderRepository::new(state.pool.clone());
    let order_id = repo.create_from_cart(user.id, &request).await?;
    let order = repo.find_with_items(order_id).await?.ok_or_else(not_found)?;

    record_order_created();
    info!(
        order_id,
        user_id = %user.id,
        restaurant_id = order.restaurant_id,
        total = order.total,
        items = order.items.len(),
        "Order created from cart"
    );
    Ok((
        StatusCode::CREATED,
        Json(order.to_response(state.media_base_url())),
    ))
}

/// Changes the status and/or driver of an order.
///
/// POST /api/v1/orders/:id/update_status
pub async fn update_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    AppJson(request): AppJson<UpdateOrderStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    if request.status.is_none() && request.driver_id.is_none() {
        return Err(ApiError::Validation(
            "Provide a status or a driver_id".to_string(),
        ));
    }

    let repo = OrderRepository::new(state.pool.clone());
    let order = repo.find_with_items(id).await?.ok_or_else(not_found)?;
    let change = resolve_order_change(&user.caller(), &order, &request)?;

    if let Some(driver_id) = request.driver_id {
        UserRepository::new(state.pool.clone())
            .find_active_driver(driver_id)
            .await?
            .ok_or_else(|| ApiError::field("driver_id", "No active driver with this id"))?;
    }

    if !repo.apply_change(id, change.status, change.driver_id).await? {
        return Err(not_found());
    }

    record_order_status_change(change.status);
    info!(
        order_id = id,
        from = order.status.as_str(),
        to = change.status.as_str(),
        driver_id = ?change.driver_id,
        updated_by = %user.id,
        "Order status updated"
    );

    let updated = repo.find_with_items(id).await?.ok_or_else(not_found)?;
    Ok(Json(updated.to_response(state.media_base_url())))
}
