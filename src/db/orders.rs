//! Order database operations
//!
//! Write path: `place_order` inserts the order header and its line items as a
//! single transaction. Read path: one joined query per shape, folded from flat
//! rows into nested orders by [`fold_orders`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, ServiceResult};

/// Status assigned to every newly placed order
pub const INITIAL_STATUS: &str = "Pending Confirmation";

/// One line item of an order being placed
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: i32,
    pub price: Decimal,
}

/// Flat row of the orders ⋈ order_items ⋈ products (⋈ users) join.
///
/// The user block and the per-item product fields are only selected by some
/// query shapes; `#[sqlx(default)]` leaves them `None` when the column is
/// absent from the result set.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderJoinRow {
    pub order_id: i64,
    #[sqlx(default)]
    pub user_id: Option<i64>,
    #[sqlx(default)]
    pub user_name: Option<String>,
    #[sqlx(default)]
    pub user_email: Option<String>,
    pub total_amount: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[sqlx(default)]
    pub product_id: Option<i64>,
    pub quantity: i32,
    pub price: Decimal,
    pub product_name: String,
    #[sqlx(default)]
    pub image_main: Option<String>,
}

/// User identity embedded in an order
#[derive(Debug, Clone, Serialize)]
pub struct OrderUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// One product line within an order
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    pub name: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Nested order: header plus line items
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub status: String,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<OrderUser>,
    pub items: Vec<OrderLine>,
}

fn validate_items(items: &[NewOrderItem]) -> Result<(), AppError> {
    if let Some(bad) = items.iter().find(|i| i.quantity <= 0) {
        return Err(AppError::validation(format!(
            "quantity must be positive (product {})",
            bad.product_id
        )));
    }
    Ok(())
}

/// Place an order: insert the header plus all line items in one transaction.
///
/// The generated order id comes back via `RETURNING`, so concurrent writers
/// can never observe each other's id. Any statement failure rolls the whole
/// unit back; no partial order is ever committed.
pub async fn place_order(
    pool: &PgPool,
    user_id: i64,
    total: Decimal,
    items: &[NewOrderItem],
) -> ServiceResult<i64> {
    validate_items(items)?;

    let mut tx = pool.begin().await?;

    let (order_id,): (i64,) = sqlx::query_as(
        "INSERT INTO orders (user_id, total_amount, status) VALUES ($1, $2, $3) RETURNING order_id",
    )
    .bind(user_id)
    .bind(total)
    .bind(INITIAL_STATUS)
    .fetch_one(&mut *tx)
    .await?;

    if !items.is_empty() {
        let order_ids: Vec<i64> = items.iter().map(|_| order_id).collect();
        let product_ids: Vec<i64> = items.iter().map(|i| i.product_id).collect();
        let quantities: Vec<i32> = items.iter().map(|i| i.quantity).collect();
        let prices: Vec<Decimal> = items.iter().map(|i| i.price).collect();
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, price)
            SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::integer[], $4::numeric[])
            "#,
        )
        .bind(&order_ids)
        .bind(&product_ids)
        .bind(&quantities)
        .bind(&prices)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(order_id)
}

/// Fold flat joined rows into nested orders.
///
/// The first row seen for an order id materializes the header (and the user
/// block when the row carries one); every row appends one line item. Result
/// preserves first-encounter order, which the queries arrange to be
/// created_at descending.
pub fn fold_orders(rows: Vec<OrderJoinRow>) -> Vec<Order> {
    let mut orders: Vec<Order> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for row in rows {
        let pos = match index.get(&row.order_id) {
            Some(&pos) => pos,
            None => {
                let user = match (row.user_id, row.user_name, row.user_email) {
                    (Some(id), Some(name), Some(email)) => Some(OrderUser { id, name, email }),
                    _ => None,
                };
                orders.push(Order {
                    id: row.order_id,
                    total: row.total_amount,
                    status: row.status,
                    date: row.created_at,
                    user,
                    items: Vec::new(),
                });
                index.insert(row.order_id, orders.len() - 1);
                orders.len() - 1
            }
        };

        orders[pos].items.push(OrderLine {
            name: row.product_name,
            quantity: row.quantity,
            price: row.price,
            product_id: row.product_id,
            image: row.image_main,
        });
    }

    orders
}

/// Orders for one user, newest first. No user block, items carry
/// name/quantity/price only.
pub async fn list_orders_for_user(pool: &PgPool, user_id: i64) -> ServiceResult<Vec<Order>> {
    let rows: Vec<OrderJoinRow> = sqlx::query_as(
        r#"
        SELECT o.order_id, o.total_amount, o.status, o.created_at,
               i.quantity, i.price, p.name AS product_name
        FROM orders o
        JOIN order_items i ON o.order_id = i.order_id
        JOIN products p ON i.product_id = p.id
        WHERE o.user_id = $1
        ORDER BY o.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(fold_orders(rows))
}

/// All orders, newest first, with the owning user's identity embedded.
pub async fn list_all_orders(pool: &PgPool) -> ServiceResult<Vec<Order>> {
    let rows: Vec<OrderJoinRow> = sqlx::query_as(
        r#"
        SELECT o.order_id, o.user_id,
               u.name AS user_name, u.email AS user_email,
               o.total_amount, o.status, o.created_at,
               i.quantity, i.price, p.name AS product_name
        FROM orders o
        JOIN users u ON o.user_id = u.user_id
        JOIN order_items i ON o.order_id = i.order_id
        JOIN products p ON i.product_id = p.id
        ORDER BY o.created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(fold_orders(rows))
}

/// Single order with user block and per-item product id/image.
///
/// Fails with `NotFound` when no rows match.
pub async fn get_order(pool: &PgPool, order_id: i64) -> ServiceResult<Order> {
    let rows: Vec<OrderJoinRow> = sqlx::query_as(
        r#"
        SELECT o.order_id, o.user_id,
               u.name AS user_name, u.email AS user_email,
               o.total_amount, o.status, o.created_at,
               i.product_id, i.quantity, i.price,
               p.name AS product_name, p.image_main
        FROM orders o
        JOIN users u ON o.user_id = u.user_id
        JOIN order_items i ON o.order_id = i.order_id
        JOIN products p ON i.product_id = p.id
        WHERE o.order_id = $1
        ORDER BY o.created_at DESC
        "#,
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    fold_orders(rows)
        .into_iter()
        .next()
        .ok_or_else(|| AppError::not_found("Order").into())
}

/// Unconditional status update. Unknown order ids affect zero rows and are
/// still acknowledged.
pub async fn update_status(pool: &PgPool, order_id: i64, status: &str) -> ServiceResult<()> {
    sqlx::query("UPDATE orders SET status = $1 WHERE order_id = $2")
        .bind(status)
        .bind(order_id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(order_id: i64, product_name: &str, quantity: i32, price_cents: i64) -> OrderJoinRow {
        OrderJoinRow {
            order_id,
            user_id: None,
            user_name: None,
            user_email: None,
            total_amount: Decimal::new(5998, 2),
            status: INITIAL_STATUS.to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            product_id: None,
            quantity,
            price: Decimal::new(price_cents, 2),
            product_name: product_name.to_string(),
            image_main: None,
        }
    }

    fn row_with_user(order_id: i64, product_name: &str) -> OrderJoinRow {
        OrderJoinRow {
            user_id: Some(7),
            user_name: Some("Ada".to_string()),
            user_email: Some("ada@example.com".to_string()),
            ..row(order_id, product_name, 1, 2999)
        }
    }

    #[test]
    fn test_fold_empty() {
        assert!(fold_orders(vec![]).is_empty());
    }

    #[test]
    fn test_fold_groups_rows_by_order() {
        let rows = vec![
            row(1, "Laptop", 2, 2999),
            row(1, "Mouse", 1, 999),
            row(2, "Keyboard", 3, 4999),
        ];
        let orders = fold_orders(rows);
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, 1);
        assert_eq!(orders[0].items.len(), 2);
        assert_eq!(orders[0].items[0].name, "Laptop");
        assert_eq!(orders[0].items[0].quantity, 2);
        assert_eq!(orders[0].items[1].name, "Mouse");
        assert_eq!(orders[1].id, 2);
        assert_eq!(orders[1].items.len(), 1);
    }

    #[test]
    fn test_fold_preserves_first_encounter_order() {
        // Rows arrive newest-first; headers must keep that order even when
        // rows for the same order are interleaved.
        let rows = vec![
            row(9, "Laptop", 1, 2999),
            row(4, "Mouse", 1, 999),
            row(9, "Keyboard", 1, 4999),
        ];
        let orders = fold_orders(rows);
        let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![9, 4]);
        assert_eq!(orders[0].items.len(), 2);
    }

    #[test]
    fn test_fold_without_user_block() {
        let orders = fold_orders(vec![row(1, "Laptop", 1, 2999)]);
        assert!(orders[0].user.is_none());
    }

    #[test]
    fn test_fold_with_user_block() {
        let orders = fold_orders(vec![row_with_user(1, "Laptop")]);
        let user = orders[0].user.as_ref().unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.com");
    }

    #[test]
    fn test_fold_carries_item_product_fields_when_selected() {
        let mut r = row(1, "Laptop", 2, 2999);
        r.product_id = Some(3);
        r.image_main = Some("laptop.jpg".to_string());
        let orders = fold_orders(vec![r]);
        assert_eq!(orders[0].items[0].product_id, Some(3));
        assert_eq!(orders[0].items[0].image.as_deref(), Some("laptop.jpg"));
    }

    #[test]
    fn test_order_serializes_without_user_key_when_absent() {
        let orders = fold_orders(vec![row(1, "Laptop", 2, 2999)]);
        let json = serde_json::to_value(&orders[0]).unwrap();
        assert!(json.get("user").is_none());
        assert_eq!(json["total"], serde_json::json!(59.98));
        assert_eq!(json["items"][0]["price"], serde_json::json!(29.99));
        assert!(json["items"][0].get("product_id").is_none());
        assert!(json["items"][0].get("image").is_none());
    }

    #[test]
    fn test_order_serializes_user_block() {
        let orders = fold_orders(vec![row_with_user(1, "Laptop")]);
        let json = serde_json::to_value(&orders[0]).unwrap();
        assert_eq!(json["user"]["id"], 7);
        assert_eq!(json["user"]["name"], "Ada");
        assert_eq!(json["user"]["email"], "ada@example.com");
    }

    #[test]
    fn test_validate_items_rejects_non_positive_quantity() {
        let items = vec![NewOrderItem {
            product_id: 3,
            quantity: 0,
            price: Decimal::new(2999, 2),
        }];
        let err = validate_items(&items).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationFailed);
        assert!(err.message.contains("product 3"));
    }

    #[test]
    fn test_validate_items_accepts_empty_order() {
        assert!(validate_items(&[]).is_ok());
    }
}
