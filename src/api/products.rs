//! Product endpoints: catalog CRUD

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use crate::db::products::{self, ProductDetail, ProductPayload, ProductSummary};
use crate::error::ServiceError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /products
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<MessageResponse>, ServiceError> {
    let id = products::create_product(&state.pool, &payload).await?;
    tracing::info!(product_id = id, "Product created");
    Ok(Json(MessageResponse {
        message: "Product created successfully".to_string(),
    }))
}

/// GET /products
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductSummary>>, ServiceError> {
    let products = products::list_products(&state.pool).await?;
    Ok(Json(products))
}

/// GET /products/{product_id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<Json<ProductDetail>, ServiceError> {
    let product = products::get_product(&state.pool, product_id).await?;
    Ok(Json(product))
}

/// PUT /products/{product_id}
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<MessageResponse>, ServiceError> {
    products::update_product(&state.pool, product_id, &payload).await?;
    Ok(Json(MessageResponse {
        message: "Product updated successfully".to_string(),
    }))
}
