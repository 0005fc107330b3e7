use serde::Deserialize;
use serde_json::json;

use crate::{
    config::MyFatoorahConfig,
    error::{AppError, AppResult},
    models::Billing,
};

use super::read_json;

#[derive(Clone)]
pub struct MyFatoorahClient {
    http: reqwest::Client,
    config: MyFatoorahConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Envelope<T> {
    is_success: bool,
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Invoice {
    #[serde(rename = "InvoiceURL")]
    pub invoice_url: String,
    pub invoice_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentStatus {
    pub invoice_id: i64,
    pub invoice_status: String,
    #[serde(default)]
    pub invoice_value: Option<f64>,
}

impl PaymentStatus {
    pub fn is_paid(&self) -> bool {
        self.invoice_status == "Paid"
    }

    /// `InvoiceValue` is reported in major units.
    pub fn charged_minor_units(&self) -> Option<i64> {
        let value = self.invoice_value?;
        let cents = (value * 100.0).round();
        (cents.is_finite() && cents.abs() < i64::MAX as f64).then_some(cents as i64)
    }
}

pub struct InvoiceRequest<'a> {
    pub amount: i64,
    pub currency: &'a str,
    pub billing: &'a Billing,
    pub callback_url: String,
    pub error_url: String,
}

impl MyFatoorahClient {
    pub fn new(http: reqwest::Client, config: MyFatoorahConfig) -> Self {
        Self { http, config }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> AppResult<T> {
        let response = self
            .http
            .post(format!("{}/{endpoint}", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;
        let envelope: Envelope<T> = read_json(response, "myfatoorah").await?;
        if !envelope.is_success {
            return Err(AppError::Gateway(format!(
                "myfatoorah {endpoint} failed: {}",
                envelope.message.unwrap_or_default()
            )));
        }
        envelope
            .data
            .ok_or_else(|| AppError::Gateway(format!("myfatoorah {endpoint} returned no data")))
    }

    pub async fn send_payment(&self, request: InvoiceRequest<'_>) -> AppResult<Invoice> {
        let billing = request.billing;
        self.call(
            "SendPayment",
            json!({
                "CustomerName": format!("{} {}", billing.first_name, billing.last_name),
                "NotificationOption": "LNK",
                "CustomerEmail": billing.email,
                "InvoiceValue": request.amount as f64 / 100.0,
                "DisplayCurrencyIso": request.currency.to_uppercase(),
                "CallBackUrl": request.callback_url,
                "ErrorUrl": request.error_url,
                "Language": "EN",
            }),
        )
        .await
    }

    pub async fn payment_status(&self, payment_id: &str) -> AppResult<PaymentStatus> {
        self.call(
            "GetPaymentStatus",
            json!({ "Key": payment_id, "KeyType": "paymentid" }),
        )
        .await
    }
}
