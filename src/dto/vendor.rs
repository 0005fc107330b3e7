use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{
    Billing, MonthlyPoint, OrderLine, OrderSupplier, PayoutMethod, VendorPayment,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub orders_count: i64,
    pub underway_count: i64,
    pub products_count: i64,
    pub balance: i64,
    pub requested: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlyChart {
    pub year: i32,
    pub products: Vec<MonthlyPoint>,
    pub orders: Vec<MonthlyPoint>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VendorDashboard {
    pub stats: DashboardStats,
    pub chart: MonthlyChart,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SplitList {
    pub items: Vec<OrderSupplier>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VendorOrderDetail {
    pub split: OrderSupplier,
    pub lines: Vec<OrderLine>,
    pub billing: Option<Billing>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct BankAccountRequest {
    #[validate(length(min = 1, max = 150))]
    pub bank_name: String,
    #[validate(length(min = 1, max = 100))]
    pub account_number: String,
    pub swift_code: Option<String>,
    #[validate(length(min = 1, max = 150))]
    pub account_name: String,
    pub country: Option<String>,
    #[validate(email)]
    pub paypal_email: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SocialLinksRequest {
    #[validate(url)]
    pub facebook: Option<String>,
    #[validate(url)]
    pub twitter: Option<String>,
    #[validate(url)]
    pub instagram: Option<String>,
    #[validate(url)]
    pub pinterest: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PayoutRequest {
    #[validate(range(min = 1, message = "Amount must be positive"))]
    pub amount: i64,
    pub method: PayoutMethod,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PayoutList {
    pub items: Vec<VendorPayment>,
}
