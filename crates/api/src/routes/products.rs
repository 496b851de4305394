//! Product routes.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::product::{
    ByRestaurantQuery, CreateProductRequest, ProductResponse, UpdateProductRequest,
    FEATURED_PRODUCT_LIMIT, POPULAR_PRODUCT_LIMIT,
};
use domain::models::Product;
use domain::services::{authorize, Action, Caller, CatalogScope, Resource};
use persistence::entities::ProductEntity;
use persistence::repositories::ProductRepository;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppJson, CurrentUser, OptionalUser};

use super::restaurants::owning_restaurant;
use super::store_image;

fn not_found() -> ApiError {
    ApiError::NotFound("Product not found".to_string())
}

fn render(state: &AppState, products: Vec<ProductEntity>) -> Vec<ProductResponse> {
    products
        .into_iter()
        .map(|p| Product::from(p).to_response(state.media_base_url()))
        .collect()
}

async fn load_product(state: &AppState, id: i64) -> Result<Product, ApiError> {
    ProductRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .map(Into::into)
        .ok_or_else(not_found)
}

fn record_of(product: &Product) -> Resource {
    Resource::RestaurantRecord {
        manager_id: product.restaurant_manager_id,
    }
}

/// Products outside the public catalog are hidden from everyone but their managers.
fn visible_to(product: &Product, caller: Option<&Caller>) -> bool {
    product.is_public() || authorize(caller, Action::Update, record_of(product)).is_ok()
}

/// Catalog-scoped listing.
///
/// GET /api/v1/products
pub async fn list_products(
    State(state): State<AppState>,
    user: OptionalUser,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let scope = CatalogScope::for_caller(user.caller().as_ref());
    let products = ProductRepository::new(state.pool.clone())
        .list(scope)
        .await?;

    Ok(Json(render(&state, products)))
}

/// GET /api/v1/products/:id
pub async fn get_product(
    State(state): State<AppState>,
    user: OptionalUser,
    Path(id): Path<i64>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = load_product(&state, id).await?;
    if !visible_to(&product, user.caller().as_ref()) {
        return Err(not_found());
    }

    Ok(Json(product.to_response(state.media_base_url())))
}

/// Available products of an active restaurant; empty without `restaurant_id`.
///
/// GET /api/v1/products/by_restaurant?restaurant_id=
pub async fn products_by_restaurant(
    State(state): State<AppState>,
    Query(query): Query<ByRestaurantQuery>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let Some(restaurant_id) = query.restaurant_id else {
        return Ok(Json(Vec::new()));
    };

    let products = ProductRepository::new(state.pool.clone())
        .list_available_for_restaurant(restaurant_id)
        .await?;
    Ok(Json(render(&state, products)))
}

/// GET /api/v1/products/popular
pub async fn popular_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = ProductRepository::new(state.pool.clone())
        .list_popular(POPULAR_PRODUCT_LIMIT)
        .await?;
    Ok(Json(render(&state, products)))
}

/// GET /api/v1/products/featured
pub async fn featured_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = ProductRepository::new(state.pool.clone())
        .list_featured(FEATURED_PRODUCT_LIMIT)
        .await?;
    Ok(Json(render(&state, products)))
}

/// Managers always create in their own restaurant; admins pass `restaurant_id`.
///
/// POST /api/v1/products
pub async fn create_product(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(request): AppJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let caller = user.caller();
    let restaurant = owning_restaurant(&state, &caller, request.restaurant_id, true)
        .await?
        .ok_or_else(|| ApiError::field("restaurant_id", "This field is required"))?;
    authorize(
        Some(&caller),
        Action::Create,
        Resource::RestaurantRecord {
            manager_id: restaurant.manager_id,
        },
    )?;
    request.validate()?;

    let product: Product = ProductRepository::new(state.pool.clone())
        .create(&request.into_new_product(restaurant.id))
        .await?
        .into();

    info!(
        product_id = product.id,
        restaurant_id = restaurant.id,
        created_by = %caller.user_id,
        "Product created"
    );
    Ok((
        StatusCode::CREATED,
        Json(product.to_response(state.media_base_url())),
    ))
}

/// PUT|PATCH /api/v1/products/:id
pub async fn update_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    AppJson(request): AppJson<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = load_product(&state, id).await?;
    authorize(Some(&user.caller()), Action::Update, record_of(&product))?;
    request.validate()?;

    let repo = ProductRepository::new(state.pool.clone());
    if !repo.update(id, &request).await? {
        return Err(not_found());
    }

    info!(product_id = id, updated_by = %user.id, "Product updated");
    let updated = load_product(&state, id).await?;
    Ok(Json(updated.to_response(state.media_base_url())))
}

/// DELETE /api/v1/products/:id
pub async fn delete_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let product = load_product(&state, id).await?;
    authorize(Some(&user.caller()), Action::Delete, record_of(&product))?;

    if !ProductRepository::new(state.pool.clone()).delete(id).await? {
        return Err(not_found());
    }

    info!(product_id = id, deleted_by = %user.id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/products/:id/upload_image
pub async fn upload_image(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = load_product(&state, id).await?;
    authorize(Some(&user.caller()), Action::Update, record_of(&product))?;

    let path = store_image(&state, "products", multipart).await?;
    if !ProductRepository::new(state.pool.clone())
        .set_image(id, &path)
        .await?
    {
        return Err(not_found());
    }

    info!(product_id = id, path = %path, "Product image updated");
    let product = Product {
        image: Some(path),
        ..product
    };
    Ok(Json(product.to_response(state.media_base_url())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::models::Role;
    use uuid::Uuid;

    fn product(is_available: bool, manager: Option<Uuid>) -> Product {
        Product {
            id: 3,
            restaurant_id: 1,
            restaurant_name: "Maquis".into(),
            restaurant_manager_id: manager,
            restaurant_is_active: true,
            category_id: None,
            category_name: None,
            name: "Alloco".into(),
            description: String::new(),
            price: 1500,
            image: None,
            is_available,
            is_popular: false,
            is_featured: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_hidden_product_visible_to_own_manager_only() {
        let manager = Caller::new(Uuid::new_v4(), Role::Manager);
        let p = product(false, Some(manager.user_id));

        assert!(visible_to(&p, Some(&manager)));
        assert!(visible_to(&p, Some(&Caller::new(Uuid::new_v4(), Role::Admin))));
        assert!(!visible_to(&p, None));
        assert!(!visible_to(&p, Some(&Caller::new(Uuid::new_v4(), Role::Client))));
        assert!(!visible_to(&p, Some(&Caller::new(Uuid::new_v4(), Role::Manager))));
    }

    #[test]
    fn test_available_product_is_public() {
        assert!(visible_to(&product(true, None), None));
    }

    #[test]
    fn test_product_of_inactive_restaurant_is_hidden() {
        let manager = Caller::new(Uuid::new_v4(), Role::Manager);
        let p = Product {
            restaurant_is_active: false,
            ..product(true, Some(manager.user_id))
        };

        assert!(!visible_to(&p, None));
        assert!(!visible_to(&p, Some(&Caller::new(Uuid::new_v4(), Role::Client))));
        assert!(visible_to(&p, Some(&manager)));
        assert!(visible_to(&p, Some(&Caller::new(Uuid::new_v4(), Role::Admin))));
    }
}
