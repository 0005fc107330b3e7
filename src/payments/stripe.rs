use serde::Deserialize;
use uuid::Uuid;

use crate::{config::StripeConfig, error::AppResult};

use super::read_json;

const API_BASE: &str = "https://api.stripe.com/v1";

#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    config: StripeConfig,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

/// The subset of a Stripe event this service reacts to.
#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: StripeEventObject,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventObject {
    pub id: String,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    /// Total charged in minor units.
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub metadata: std::collections::HashMap<String, String>,
}

impl StripeEventObject {
    pub fn is_paid(&self) -> bool {
        self.payment_status.as_deref() == Some("paid")
    }

    pub fn order_id(&self) -> Option<Uuid> {
        self.metadata
            .get("order_id")
            .and_then(|v| Uuid::parse_str(v).ok())
    }
}

pub struct SessionRequest<'a> {
    pub order_id: Uuid,
    pub amount: i64,
    pub currency: &'a str,
    pub customer_email: &'a str,
    pub success_url: String,
    pub cancel_url: String,
}

impl StripeClient {
    pub fn new(http: reqwest::Client, config: StripeConfig) -> Self {
        Self { http, config }
    }

    pub fn webhook_secret(&self) -> &str {
        &self.config.webhook_secret
    }

    pub async fn create_checkout_session(
        &self,
        request: SessionRequest<'_>,
    ) -> AppResult<CheckoutSession> {
        let order_id = request.order_id.to_string();
        let amount = request.amount.to_string();
        let product_name = format!("Order Number: {order_id}");
        let form: Vec<(&str, &str)> = vec![
            ("mode", "payment"),
            ("payment_method_types[]", "card"),
            ("line_items[0][quantity]", "1"),
            ("line_items[0][price_data][currency]", request.currency),
            ("line_items[0][price_data][unit_amount]", amount.as_str()),
            ("line_items[0][price_data][product_data][name]", product_name.as_str()),
            ("metadata[order_id]", order_id.as_str()),
            ("customer_email", request.customer_email),
            ("success_url", request.success_url.as_str()),
            ("cancel_url", request.cancel_url.as_str()),
        ];

        let response = self
            .http
            .post(format!("{API_BASE}/checkout/sessions"))
            .bearer_auth(&self.config.secret_key)
            .form(&form)
            .send()
            .await?;
        read_json(response, "stripe").await
    }
}
