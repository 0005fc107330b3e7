use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Product, ProductRating, Promotional};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 300))]
    pub name: String,
    pub description: String,
    pub content: Option<String>,
    #[validate(range(min = 0, max = 10_000_000_000i64, message = "Price is out of range"))]
    pub price: i64,
    #[validate(range(min = 0, max = 10_000_000_000i64))]
    pub discount_price: Option<i64>,
    #[validate(range(min = 0, max = 1_000_000_000i64))]
    pub weight_grams: Option<i64>,
    #[validate(range(min = 0, max = 1_000_000, message = "Available must be between 0 and 1000000"))]
    pub available: i32,
    pub sku: Option<String>,
    pub on_sale: Option<bool>,
    pub promotional: Option<Promotional>,
    pub tags: Option<String>,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate, Default)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 300))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    #[validate(range(min = 0, max = 10_000_000_000i64))]
    pub price: Option<i64>,
    #[validate(range(min = 0, max = 10_000_000_000i64))]
    pub discount_price: Option<i64>,
    #[validate(range(min = 0, max = 1_000_000_000i64))]
    pub weight_grams: Option<i64>,
    #[validate(range(min = 0, max = 1_000_000))]
    pub available: Option<i32>,
    pub sku: Option<String>,
    pub on_sale: Option<bool>,
    pub promotional: Option<Promotional>,
    pub tags: Option<String>,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AddSizeRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RateProductRequest {
    #[validate(range(min = 1, max = 5, message = "Rate must be between 1 and 5"))]
    pub rate: i32,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RatingList {
    pub items: Vec<ProductRating>,
}
