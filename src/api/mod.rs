//! API routes for market-api

pub mod health;
pub mod orders;
pub mod products;

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/products",
            post(products::create_product).get(products::list_products),
        )
        .route(
            "/products/{product_id}",
            get(products::get_product).put(products::update_product),
        )
        .route("/orders", post(orders::place_order).get(orders::list_all_orders))
        .route("/orders/user/{user_id}", get(orders::list_user_orders))
        .route("/orders/{order_id}", get(orders::get_order))
        .route("/orders/{order_id}/status", put(orders::update_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
