//! Order endpoints: place order, list orders, order detail, status update

use axum::Json;
use axum::extract::{Path, State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::orders::{self, NewOrderItem, Order};
use crate::error::ServiceError;
use crate::state::AppState;

/// POST /orders request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub user_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub items: Vec<OrderItemInput>,
}

/// One cart line in the POST /orders body
#[derive(Debug, Deserialize)]
pub struct OrderItemInput {
    pub id: i64,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    pub success: bool,
    pub order_id: i64,
}

/// POST /orders
pub async fn place_order(
    State(state): State<AppState>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<Json<PlaceOrderResponse>, ServiceError> {
    let items: Vec<NewOrderItem> = req
        .items
        .iter()
        .map(|i| NewOrderItem {
            product_id: i.id,
            quantity: i.quantity,
            price: i.price,
        })
        .collect();

    let order_id = orders::place_order(&state.pool, req.user_id, req.total, &items).await?;

    tracing::info!(order_id, user_id = req.user_id, "Order placed");

    Ok(Json(PlaceOrderResponse {
        success: true,
        order_id,
    }))
}

/// GET /orders/user/{user_id}
pub async fn list_user_orders(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Order>>, ServiceError> {
    let orders = orders::list_orders_for_user(&state.pool, user_id).await?;
    Ok(Json(orders))
}

/// GET /orders
pub async fn list_all_orders(
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>, ServiceError> {
    let orders = orders::list_all_orders(&state.pool).await?;
    Ok(Json(orders))
}

/// GET /orders/{order_id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
) -> Result<Json<Order>, ServiceError> {
    let order = orders::get_order(&state.pool, order_id).await?;
    Ok(Json(order))
}

/// PUT /orders/{order_id}/status request body
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateStatusResponse {
    pub success: bool,
    pub message: String,
}

/// PUT /orders/{order_id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<UpdateStatusResponse>, ServiceError> {
    orders::update_status(&state.pool, order_id, &req.status).await?;
    Ok(Json(UpdateStatusResponse {
        success: true,
        message: "Order status updated".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_order_request_decodes_wire_shape() {
        let req: PlaceOrderRequest = serde_json::from_str(
            r#"{"userId":7,"total":59.98,"items":[{"id":3,"quantity":2,"price":29.99}]}"#,
        )
        .unwrap();
        assert_eq!(req.user_id, 7);
        assert_eq!(req.total, Decimal::new(5998, 2));
        assert_eq!(req.items.len(), 1);
        assert_eq!(req.items[0].id, 3);
        assert_eq!(req.items[0].quantity, 2);
        assert_eq!(req.items[0].price, Decimal::new(2999, 2));
    }

    #[test]
    fn test_place_order_request_accepts_empty_items() {
        let req: PlaceOrderRequest =
            serde_json::from_str(r#"{"userId":7,"total":0.0,"items":[]}"#).unwrap();
        assert!(req.items.is_empty());
    }

    #[test]
    fn test_place_order_response_shape() {
        let json = serde_json::to_string(&PlaceOrderResponse {
            success: true,
            order_id: 42,
        })
        .unwrap();
        assert_eq!(json, r#"{"success":true,"orderId":42}"#);
    }

    #[test]
    fn test_update_status_shapes() {
        let req: UpdateStatusRequest = serde_json::from_str(r#"{"status":"Shipped"}"#).unwrap();
        assert_eq!(req.status, "Shipped");

        let json = serde_json::to_value(UpdateStatusResponse {
            success: true,
            message: "Order status updated".to_string(),
        })
        .unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Order status updated");
    }
}
