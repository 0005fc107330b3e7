//! Clients for the external payment providers.
//!
//! Each client is present only when its credentials are configured.

pub mod myfatoorah;
pub mod paymob;
pub mod paypal;
pub mod razorpay;
pub mod signature;
pub mod stripe;

use serde::de::DeserializeOwned;

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
    models::PaymentMethod,
};

pub use myfatoorah::MyFatoorahClient;
pub use paymob::PaymobClient;
pub use paypal::PaypalClient;
pub use razorpay::RazorpayClient;
pub use stripe::StripeClient;

#[derive(Clone, Default)]
pub struct Gateways {
    pub stripe: Option<StripeClient>,
    pub razorpay: Option<RazorpayClient>,
    pub paypal: Option<PaypalClient>,
    pub paymob: Option<PaymobClient>,
    pub myfatoorah: Option<MyFatoorahClient>,
}

impl Gateways {
    pub fn from_config(config: &AppConfig, http: reqwest::Client) -> Self {
        Self {
            stripe: config
                .stripe
                .clone()
                .map(|c| StripeClient::new(http.clone(), c)),
            razorpay: config
                .razorpay
                .clone()
                .map(|c| RazorpayClient::new(http.clone(), c)),
            paypal: config
                .paypal
                .clone()
                .map(|c| PaypalClient::new(http.clone(), c)),
            paymob: config
                .paymob
                .clone()
                .map(|c| PaymobClient::new(http.clone(), c)),
            myfatoorah: config
                .myfatoorah
                .clone()
                .map(|c| MyFatoorahClient::new(http, c)),
        }
    }

    pub fn enabled_methods(&self) -> Vec<PaymentMethod> {
        let mut methods = vec![PaymentMethod::Balance, PaymentMethod::Cash];
        if self.stripe.is_some() {
            methods.push(PaymentMethod::Stripe);
        }
        if self.razorpay.is_some() {
            methods.push(PaymentMethod::Razorpay);
        }
        if self.paypal.is_some() {
            methods.push(PaymentMethod::Paypal);
        }
        if self.paymob.is_some() {
            methods.push(PaymentMethod::Paymob);
        }
        if self.myfatoorah.is_some() {
            methods.push(PaymentMethod::Myfatoorah);
        }
        methods
    }
}

pub fn not_configured(method: PaymentMethod) -> AppError {
    AppError::BadRequest(format!("Payment method {method} is not configured"))
}

/// Renders minor units as a decimal string, e.g. `1250` -> `"12.50"`.
pub fn to_major_units(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Parses a decimal amount such as `"12.5"` or `"12.50"` into minor units.
///
/// Returns `None` for more than two fractional digits or values outside `i64`.
pub fn from_major_units(value: &str) -> Option<i64> {
    let value = value.trim();
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty() || fraction.len() > 2 {
        return None;
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let whole: i64 = whole.parse().ok()?;
    let cents: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };
    let amount = whole.checked_mul(100)?.checked_add(cents)?;
    Some(if negative { -amount } else { amount })
}

pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    provider: &str,
) -> AppResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::Gateway(format!(
            "{provider} responded with {status}: {body}"
        )));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| AppError::Gateway(format!("{provider} returned an unexpected body: {e}")))
}
