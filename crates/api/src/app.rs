use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    auth_rate_limit, metrics_handler, metrics_middleware, require_user_auth,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{
    admin_users, auth, banners, cart, categories, driver, health, manager, orders, products,
    restaurants, settings, team,
};
use crate::services::{LocalMediaStorage, MediaStorage};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub media: Arc<dyn MediaStorage>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool) -> Result<Self, JwtError> {
        let jwt = JwtConfig::from_rsa_pem(
            &normalize_pem(&config.jwt.private_key),
            &normalize_pem(&config.jwt.public_key),
            config.jwt.access_token_expiry_secs,
            config.jwt.refresh_token_expiry_secs,
            config.jwt.leeway_secs,
        )?;
        let media = LocalMediaStorage::new(&config.media);
        let rate_limiter =
            RateLimiterState::new(config.security.auth_rate_limit_per_minute).map(Arc::new);

        Ok(Self {
            pool,
            config: Arc::new(config),
            jwt: Arc::new(jwt),
            media: Arc::new(media),
            rate_limiter,
        })
    }

    /// Base URL that stored media paths are rendered against.
    pub fn media_base_url(&self) -> &str {
        &self.config.media.public_base_url
    }
}

/// PEM keys passed through env files often carry literal `\n` sequences.
fn normalize_pem(key: &str) -> String {
    key.trim()
        .trim_matches('"')
        .trim_matches('\'')
        .replace("\\n", "\n")
}

pub fn create_app(config: Config, pool: PgPool) -> Result<Router, JwtError> {
    Ok(build_router(AppState::new(config, pool)?))
}

pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Unauthenticated auth endpoints, limited per client address
    let auth_routes = Router::new()
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_rate_limit));

    // Catalog reads; a bearer token is optional and only widens what is listed
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/categories", get(categories::list_categories))
        .route("/api/v1/categories/:id", get(categories::get_category))
        .route("/api/v1/restaurants", get(restaurants::list_restaurants))
        .route(
            "/api/v1/restaurants/by_category",
            get(restaurants::restaurants_by_category),
        )
        .route(
            "/api/v1/restaurants/featured",
            get(restaurants::featured_restaurants),
        )
        .route("/api/v1/restaurants/:id", get(restaurants::get_restaurant))
        .route("/api/v1/products", get(products::list_products))
        .route(
            "/api/v1/products/by_restaurant",
            get(products::products_by_restaurant),
        )
        .route("/api/v1/products/popular", get(products::popular_products))
        .route("/api/v1/products/featured", get(products::featured_products))
        .route("/api/v1/products/:id", get(products::get_product))
        .route("/api/v1/banners", get(banners::list_banners))
        .route("/api/v1/banners/:id", get(banners::get_banner))
        .route("/api/v1/settings", get(settings::list_settings));

    let protected_routes = Router::new()
        // Session and profile
        .route("/api/v1/auth/logout", post(auth::logout))
        .route(
            "/api/v1/auth/profile",
            get(auth::get_profile)
                .put(auth::update_profile)
                .patch(auth::update_profile),
        )
        .route("/api/v1/auth/profile/avatar", post(auth::upload_avatar))
        // Catalog management
        .route("/api/v1/categories", post(categories::create_category))
        .route(
            "/api/v1/categories/:id",
            put(categories::update_category)
                .patch(categories::update_category)
                .delete(categories::delete_category),
        )
        .route("/api/v1/restaurants", post(restaurants::create_restaurant))
        .route(
            "/api/v1/restaurants/:id",
            put(restaurants::update_restaurant)
                .patch(restaurants::update_restaurant)
                .delete(restaurants::delete_restaurant),
        )
        .route(
            "/api/v1/restaurants/:id/toggle_open",
            post(restaurants::toggle_open),
        )
        .route(
            "/api/v1/restaurants/:id/upload_image",
            post(restaurants::upload_image),
        )
        .route("/api/v1/products", post(products::create_product))
        .route(
            "/api/v1/products/:id",
            put(products::update_product)
                .patch(products::update_product)
                .delete(products::delete_product),
        )
        .route(
            "/api/v1/products/:id/upload_image",
            post(products::upload_image),
        )
        .route("/api/v1/banners", post(banners::create_banner))
        .route(
            "/api/v1/banners/:id",
            put(banners::update_banner)
                .patch(banners::update_banner)
                .delete(banners::delete_banner),
        )
        .route(
            "/api/v1/team",
            get(team::list_team_members).post(team::create_team_member),
        )
        .route(
            "/api/v1/team/:id",
            get(team::get_team_member)
                .put(team::update_team_member)
                .patch(team::update_team_member)
                .delete(team::delete_team_member),
        )
        .route(
            "/api/v1/settings/:key",
            put(settings::upsert_setting).delete(settings::delete_setting),
        )
        // Cart and orders
        .route("/api/v1/cart", get(cart::get_cart))
        .route(
            "/api/v1/cart/items",
            post(cart::add_item)
                .put(cart::update_item)
                .delete(cart::remove_item),
        )
        .route("/api/v1/orders", get(orders::list_orders))
        .route("/api/v1/orders/pending", get(orders::pending_orders))
        .route(
            "/api/v1/orders/create_from_cart",
            post(orders::create_from_cart),
        )
        .route("/api/v1/orders/:id", get(orders::get_order))
        .route(
            "/api/v1/orders/:id/update_status",
            post(orders::update_status),
        )
        // Driver area
        .route("/api/v1/driver/schedule", get(driver::get_schedule))
        .route(
            "/api/v1/driver/schedule/update_day",
            post(driver::update_day),
        )
        .route(
            "/api/v1/driver/schedule/toggle_availability",
            post(driver::toggle_availability),
        )
        .route("/api/v1/driver/dashboard", get(driver::dashboard))
        .route("/api/v1/driver/missions", get(driver::missions))
        // Manager area
        .route("/api/v1/manager/dashboard", get(manager::dashboard))
        .route("/api/v1/manager/restaurant", get(manager::my_restaurant))
        // Back office
        .route(
            "/api/v1/admin/users",
            get(admin_users::list_users).post(admin_users::create_user),
        )
        .route("/api/v1/admin/users/drivers", get(admin_users::list_drivers))
        .route("/api/v1/admin/users/managers", get(admin_users::list_managers))
        .route(
            "/api/v1/admin/users/bulk_availability",
            post(admin_users::bulk_availability),
        )
        .route(
            "/api/v1/admin/users/:id",
            get(admin_users::get_user)
                .put(admin_users::update_user)
                .patch(admin_users::update_user)
                .delete(admin_users::delete_user),
        )
        .route(
            "/api/v1/admin/orders/bulk_status",
            post(admin_users::bulk_order_status),
        )
        .route(
            "/api/v1/admin/restaurants/bulk_open",
            post(admin_users::bulk_restaurants_open),
        )
        .route(
            "/api/v1/admin/products/bulk_flags",
            post(admin_users::bulk_product_flags),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
