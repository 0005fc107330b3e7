use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Coupon, MonthlyPoint, OrderStatus, PayoutStatus, Profile};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct InventoryAdjustRequest {
    #[validate(range(min = -1_000_000, max = 1_000_000))]
    pub delta: i32,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CouponRequest {
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    #[validate(range(min = 0, max = 100, message = "Discount must be between 0 and 100"))]
    pub discount: i32,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema, Validate, Default)]
pub struct UpdateCouponRequest {
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
    #[validate(range(min = 0, max = 100, message = "Discount must be between 0 and 100"))]
    pub discount: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CouponList {
    pub items: Vec<Coupon>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VendorList {
    pub items: Vec<Profile>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdatePayoutRequest {
    pub status: PayoutStatus,
    #[validate(range(min = 0))]
    pub fee: Option<i64>,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SiteSettingsRequest {
    #[validate(length(min = 1, max = 150))]
    pub site_name: String,
    #[validate(length(min = 1, max = 500))]
    pub site_title: String,
    pub description: Option<String>,
    #[validate(url)]
    pub site_url: Option<String>,
    #[validate(range(min = 0))]
    pub shipping_fee: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentModerationRequest {
    pub active: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalesReport {
    pub finished_orders: i64,
    pub revenue: i64,
    pub by_status: Vec<StatusCount>,
    pub vendors: i64,
    pub products: i64,
    pub year: i32,
    pub monthly_orders: Vec<MonthlyPoint>,
    pub monthly_products: Vec<MonthlyPoint>,
}
