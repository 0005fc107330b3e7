use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Coupon, Order, OrderLine, OrderSupplier};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    #[validate(range(max = 1_000_000))]
    pub quantity: i32,
    #[validate(length(min = 1, max = 50))]
    pub size: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ApplyCouponRequest {
    #[validate(length(min = 1, max = 50))]
    pub code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub order: Order,
    pub lines: Vec<OrderLine>,
    pub suppliers: Vec<OrderSupplier>,
    pub coupon: Option<Coupon>,
}
