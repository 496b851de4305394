//! Shopping cart routes. Every user has exactly one cart, created on demand.

use axum::{
    extract::{Query, State},
    Json,
};
use domain::models::cart::{
    AddCartItemRequest, CartResponse, RemoveCartItemQuery, UpdateCartItemRequest,
};
use persistence::repositories::{CartRepository, ProductRepository};
use tracing::{debug, info};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppJson, CurrentUser};

async fn render_cart(
    state: &AppState,
    repo: &CartRepository,
    cart_id: i64,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = repo
        .find(cart_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Cart not found".to_string()))?;
    let lines = repo.lines(cart_id).await?;

    Ok(Json(cart.into_cart(lines).to_response(state.media_base_url())))
}

/// GET /api/v1/cart
pub async fn get_cart(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<CartResponse>, ApiError> {
    let repo = CartRepository::new(state.pool.clone());
    let cart = repo.get_or_create(user.id).await?;
    let lines = repo.lines(cart.id).await?;

    Ok(Json(cart.into_cart(lines).to_response(state.media_base_url())))
}

/// Adds a product, merging with an existing line.
///
/// POST /api/v1/cart/items
pub async fn add_item(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(request): AppJson<AddCartItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    request.validate()?;

    ProductRepository::new(state.pool.clone())
        .find_by_id(request.product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    let repo = CartRepository::new(state.pool.clone());
    let cart = repo.get_or_create(user.id).await?;
    repo.add_item(cart.id, request.product_id, request.quantity)
        .await?;

    debug!(
        cart_id = cart.id,
        product_id = request.product_id,
        quantity = request.quantity,
        "Cart item added"
    );
    render_cart(&state, &repo, cart.id).await
}

/// Sets a line's quantity; zero or less removes the line.
///
/// PUT /api/v1/cart/items
pub async fn update_item(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(request): AppJson<UpdateCartItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    request.validate()?;

    let repo = CartRepository::new(state.pool.clone());
    let cart = repo.get_or_create(user.id).await?;
    if !repo
        .set_quantity(cart.id, request.product_id, request.quantity)
        .await?
    {
        return Err(ApiError::NotFound("Item not in cart".to_string()));
    }

    debug!(
        cart_id = cart.id,
        product_id = request.product_id,
        quantity = request.quantity,
        "Cart item updated"
    );
    render_cart(&state, &repo, cart.id).await
}

/// Removes one product, or empties the cart when `product_id` is absent.
///
/// DELETE /api/v1/cart/items?product_id=
pub async fn remove_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<RemoveCartItemQuery>,
) -> Result<Json<CartResponse>, ApiError> {
    let repo = CartRepository::new(state.pool.clone());
    let cart = repo.get_or_create(user.id).await?;

    match query.product_id {
        Some(product_id) => {
            repo.remove_item(cart.id, product_id).await?;
            debug!(cart_id = cart.id, product_id, "Cart item removed");
        }
        None => {
            repo.clear(cart.id).await?;
            info!(cart_id = cart.id, user_id = %user.id, "Cart cleared");
        }
    }

    render_cart(&state, &repo, cart.id).await
}
