//! Shipping rate quotes and shipment creation.

pub mod aramex;

use async_trait::async_trait;

use crate::{error::AppResult, models::Billing};

pub use aramex::AramexProvider;

#[derive(Debug, Clone)]
pub struct RateRequest {
    pub weight_grams: i64,
    pub destination_country_code: String,
    pub destination_city: String,
    pub destination_post_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ShipmentRequest {
    pub reference: String,
    pub weight_grams: i64,
    pub shipper_name: String,
    pub consignee: Billing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shipment {
    pub tracking_no: String,
    pub label_url: Option<String>,
}

/// A carrier able to price and book deliveries.
#[async_trait]
pub trait ShippingProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Shipping cost in minor units.
    async fn quote(&self, request: &RateRequest) -> AppResult<i64>;

    async fn create_shipment(&self, request: &ShipmentRequest) -> AppResult<Shipment>;
}
