use serde::{Deserialize, Serialize};

use crate::{config::RazorpayConfig, error::AppResult};

use super::{read_json, signature::verify_razorpay_signature};

const API_BASE: &str = "https://api.razorpay.com/v1";

#[derive(Clone)]
pub struct RazorpayClient {
    http: reqwest::Client,
    config: RazorpayConfig,
}

#[derive(Debug, Serialize)]
struct CreateOrder<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

impl RazorpayClient {
    pub fn new(http: reqwest::Client, config: RazorpayConfig) -> Self {
        Self { http, config }
    }

    pub fn key_id(&self) -> &str {
        &self.config.key_id
    }

    pub async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> AppResult<RazorpayOrder> {
        let response = self
            .http
            .post(format!("{API_BASE}/orders"))
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&CreateOrder {
                amount,
                currency: &currency.to_uppercase(),
                receipt,
            })
            .send()
            .await?;
        read_json(response, "razorpay").await
    }

    pub fn verify_payment(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        verify_razorpay_signature(order_id, payment_id, signature, &self.config.key_secret)
    }
}
