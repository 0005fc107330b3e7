use serde::Deserialize;
use serde_json::json;

use crate::{config::PaymobConfig, error::AppResult, models::Billing};

use super::read_json;

const API_BASE: &str = "https://accept.paymob.com/api";

#[derive(Clone)]
pub struct PaymobClient {
    http: reqwest::Client,
    config: PaymobConfig,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct RegisteredOrder {
    id: i64,
}

#[derive(Debug, Deserialize)]
pub struct PaymobTransaction {
    pub id: i64,
    pub success: bool,
    pub amount_cents: i64,
    pub order: Option<PaymobOrderRef>,
}

#[derive(Debug, Deserialize)]
pub struct PaymobOrderRef {
    pub id: i64,
}

#[derive(Debug)]
pub struct PaymobSession {
    pub paymob_order_id: String,
    pub iframe_url: String,
}

impl PaymobClient {
    pub fn new(http: reqwest::Client, config: PaymobConfig) -> Self {
        Self { http, config }
    }

    async fn auth_token(&self) -> AppResult<String> {
        let response = self
            .http
            .post(format!("{API_BASE}/auth/tokens"))
            .json(&json!({ "api_key": self.config.api_key }))
            .send()
            .await?;
        let token: TokenResponse = read_json(response, "paymob").await?;
        Ok(token.token)
    }

    /// Registers the order with PayMob and returns the hosted iframe URL.
    pub async fn create_session(
        &self,
        merchant_order_id: &str,
        amount_cents: i64,
        billing: &Billing,
    ) -> AppResult<PaymobSession> {
        let auth_token = self.auth_token().await?;

        let response = self
            .http
            .post(format!("{API_BASE}/ecommerce/orders"))
            .json(&json!({
                "auth_token": auth_token,
                "delivery_needed": "false",
                "amount_cents": amount_cents.to_string(),
                "currency": self.config.currency,
                "merchant_order_id": merchant_order_id,
                "items": [],
            }))
            .send()
            .await?;
        let registered: RegisteredOrder = read_json(response, "paymob").await?;

        let response = self
            .http
            .post(format!("{API_BASE}/acceptance/payment_keys"))
            .json(&json!({
                "auth_token": auth_token,
                "amount_cents": amount_cents.to_string(),
                "expiration": 3600,
                "order_id": registered.id.to_string(),
                "billing_data": {
                    "apartment": "NA",
                    "floor": "NA",
                    "building": "NA",
                    "email": billing.email,
                    "first_name": billing.first_name,
                    "last_name": billing.last_name,
                    "street": billing.street_address,
                    "phone_number": billing.phone,
                    "shipping_method": "PKG",
                    "postal_code": billing.post_code.clone().unwrap_or_else(|| "NA".into()),
                    "city": billing.city,
                    "country": billing.country_code,
                    "state": billing.state.clone().unwrap_or_else(|| "NA".into()),
                },
                "currency": self.config.currency,
                "integration_id": self.config.integration_id,
                "lock_order_when_paid": "true",
            }))
            .send()
            .await?;
        let payment_key: TokenResponse = read_json(response, "paymob").await?;

        Ok(PaymobSession {
            paymob_order_id: registered.id.to_string(),
            iframe_url: format!(
                "{API_BASE}/acceptance/iframes/{}?payment_token={}",
                self.config.iframe_id, payment_key.token
            ),
        })
    }

    pub async fn transaction(&self, transaction_id: i64) -> AppResult<PaymobTransaction> {
        let auth_token = self.auth_token().await?;
        let response = self
            .http
            .get(format!("{API_BASE}/acceptance/transactions/{transaction_id}"))
            .bearer_auth(auth_token)
            .send()
            .await?;
        read_json(response, "paymob").await
    }
}
