//! Product database operations

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use sqlx::types::Json;

use crate::error::{AppError, ServiceResult};

/// Incoming product payload (create and update share the same shape)
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPayload {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image_main: String,
    pub description: String,
    pub category: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub rating: Option<Decimal>,
    #[serde(default)]
    pub reviews: Option<i32>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub specifications: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    price: Decimal,
    image_main: String,
    description: String,
    category: String,
    rating: Option<Decimal>,
    reviews: Option<i32>,
    images: Json<Vec<String>>,
    features: Json<Vec<String>>,
    specifications: Json<serde_json::Map<String, serde_json::Value>>,
}

/// Catalog listing shape
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub id: i64,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image: String,
    pub description: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub rating: Option<Decimal>,
    pub reviews: Option<i32>,
}

/// Detail shape with the serialized list/map fields included
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    pub id: i64,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image: String,
    pub images: Vec<String>,
    pub description: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub rating: Option<Decimal>,
    pub reviews: Option<i32>,
    pub features: Vec<String>,
    pub specifications: serde_json::Map<String, serde_json::Value>,
}

// Stored zero means "no rating yet"; readers expect it as absent.
fn non_zero_rating(rating: Option<Decimal>) -> Option<Decimal> {
    rating.filter(|r| !r.is_zero())
}

fn non_zero_reviews(reviews: Option<i32>) -> Option<i32> {
    reviews.filter(|r| *r != 0)
}

impl From<ProductRow> for ProductSummary {
    fn from(r: ProductRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            price: r.price,
            image: r.image_main,
            description: r.description,
            category: r.category,
            rating: non_zero_rating(r.rating),
            reviews: non_zero_reviews(r.reviews),
        }
    }
}

impl From<ProductRow> for ProductDetail {
    fn from(r: ProductRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            price: r.price,
            image: r.image_main,
            images: r.images.0,
            description: r.description,
            category: r.category,
            rating: non_zero_rating(r.rating),
            reviews: non_zero_reviews(r.reviews),
            features: r.features.0,
            specifications: r.specifications.0,
        }
    }
}

pub async fn create_product(pool: &PgPool, data: &ProductPayload) -> ServiceResult<i64> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO products (
            name, price, image_main, description, category, rating, reviews,
            images, features, specifications
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id
        "#,
    )
    .bind(&data.name)
    .bind(data.price)
    .bind(&data.image_main)
    .bind(&data.description)
    .bind(&data.category)
    .bind(data.rating)
    .bind(data.reviews)
    .bind(Json(&data.images))
    .bind(Json(&data.features))
    .bind(Json(&data.specifications))
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn list_products(pool: &PgPool) -> ServiceResult<Vec<ProductSummary>> {
    let rows: Vec<ProductRow> = sqlx::query_as(
        r#"
        SELECT id, name, price, image_main, description, category, rating, reviews,
               images, features, specifications
        FROM products
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(ProductSummary::from).collect())
}

pub async fn get_product(pool: &PgPool, product_id: i64) -> ServiceResult<ProductDetail> {
    let row: Option<ProductRow> = sqlx::query_as(
        r#"
        SELECT id, name, price, image_main, description, category, rating, reviews,
               images, features, specifications
        FROM products
        WHERE id = $1
        "#,
    )
    .bind(product_id)
    .fetch_optional(pool)
    .await?;
    row.map(ProductDetail::from)
        .ok_or_else(|| AppError::not_found("Product").into())
}

pub async fn update_product(
    pool: &PgPool,
    product_id: i64,
    data: &ProductPayload,
) -> ServiceResult<()> {
    let rows = sqlx::query(
        r#"
        UPDATE products SET
            name = $1,
            price = $2,
            image_main = $3,
            description = $4,
            category = $5,
            rating = $6,
            reviews = $7,
            images = $8,
            features = $9,
            specifications = $10
        WHERE id = $11
        "#,
    )
    .bind(&data.name)
    .bind(data.price)
    .bind(&data.image_main)
    .bind(&data.description)
    .bind(&data.category)
    .bind(data.rating)
    .bind(data.reviews)
    .bind(Json(&data.images))
    .bind(Json(&data.features))
    .bind(Json(&data.specifications))
    .bind(product_id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(AppError::not_found("Product").into());
    }
    Ok(())
}
