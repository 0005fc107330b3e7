use serde::Deserialize;

use crate::{config::PaypalConfig, error::AppResult};

use super::read_json;

#[derive(Clone)]
pub struct PaypalClient {
    http: reqwest::Client,
    config: PaypalConfig,
}

#[derive(Debug, Deserialize)]
struct AccessToken {
    access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct PaypalOrder {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub purchase_units: Vec<PurchaseUnit>,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseUnit {
    pub amount: Option<PaypalAmount>,
}

#[derive(Debug, Deserialize)]
pub struct PaypalAmount {
    pub currency_code: String,
    pub value: String,
}

impl PaypalOrder {
    pub fn is_completed(&self) -> bool {
        self.status == "COMPLETED"
    }

    pub fn total_value(&self) -> Option<&str> {
        self.purchase_units
            .first()
            .and_then(|unit| unit.amount.as_ref())
            .map(|amount| amount.value.as_str())
    }
}

impl PaypalClient {
    pub fn new(http: reqwest::Client, config: PaypalConfig) -> Self {
        Self { http, config }
    }

    async fn access_token(&self) -> AppResult<String> {
        let response = self
            .http
            .post(format!("{}/v1/oauth2/token", self.config.base_url))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let token: AccessToken = read_json(response, "paypal").await?;
        Ok(token.access_token)
    }

    pub async fn get_order(&self, paypal_order_id: &str) -> AppResult<PaypalOrder> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(format!(
                "{}/v2/checkout/orders/{paypal_order_id}",
                self.config.base_url
            ))
            .bearer_auth(token)
            .send()
            .await?;
        read_json(response, "paypal").await
    }
}
