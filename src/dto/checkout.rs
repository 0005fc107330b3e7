use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Billing, Order, PaymentMethod};

#[derive(Debug, Deserialize, ToSchema, Validate, Clone)]
pub struct BillingRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
    #[validate(length(equal = 2, message = "Country code must be ISO 3166 alpha-2"))]
    pub country_code: String,
    pub state: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 300))]
    pub street_address: String,
    pub post_code: Option<String>,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 5, max = 30))]
    pub phone: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutSummary {
    pub order: Order,
    pub billing: Billing,
    pub payment_methods: Vec<PaymentMethod>,
    pub wallet_balance: i64,
}

/// A hosted payment page the client should redirect to.
#[derive(Debug, Serialize, ToSchema)]
pub struct RedirectSession {
    pub provider: PaymentMethod,
    pub url: String,
    pub reference: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RazorpayOrderResponse {
    pub key_id: String,
    pub razorpay_order_id: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RazorpayVerifyRequest {
    #[validate(length(min = 1))]
    pub razorpay_order_id: String,
    #[validate(length(min = 1))]
    pub razorpay_payment_id: String,
    #[validate(length(min = 1))]
    pub razorpay_signature: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PaypalVerifyRequest {
    #[validate(length(min = 1))]
    pub paypal_order_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymobCallbackQuery {
    pub order: String,
    pub merchant_order_id: String,
    pub id: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MyFatoorahCallbackQuery {
    #[serde(rename = "paymentId")]
    pub payment_id: String,
}

#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct WebhookAck {
    pub status: String,
}

impl WebhookAck {
    pub fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
        }
    }
}
