use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    config::AramexConfig,
    error::{AppError, AppResult},
    payments::read_json,
};

use super::{RateRequest, Shipment, ShipmentRequest, ShippingProvider};

/// Carrier rate is marked up by this percentage before it is charged.
pub const RATE_MARKUP_PERCENT: i64 = 141;

pub struct AramexProvider {
    http: reqwest::Client,
    config: AramexConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Notification {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RateResponse {
    has_errors: bool,
    #[serde(default)]
    notifications: Vec<Notification>,
    total_amount: Option<Money>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Money {
    value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ShipmentResponse {
    has_errors: bool,
    #[serde(default)]
    notifications: Vec<Notification>,
    #[serde(default)]
    shipments: Vec<ProcessedShipment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProcessedShipment {
    #[serde(rename = "ID")]
    id: String,
    shipment_label: Option<Label>,
}

#[derive(Debug, Deserialize)]
struct Label {
    #[serde(rename = "LabelURL")]
    label_url: Option<String>,
}

/// Product group and type: domestic when shipping inside the account country.
pub fn product_codes(account_country: &str, destination_country: &str) -> (&'static str, &'static str) {
    if account_country.eq_ignore_ascii_case(destination_country) {
        ("DOM", "OND")
    } else {
        ("EXP", "PPX")
    }
}

/// Converts a carrier rate in major units to charged minor units.
pub fn charged_amount(rate_major: f64) -> i64 {
    let minor = (rate_major * 100.0).round() as i64;
    (minor * RATE_MARKUP_PERCENT + 50) / 100
}

fn grams_to_kg(weight_grams: i64) -> f64 {
    weight_grams as f64 / 1000.0
}

fn notifications_text(notifications: &[Notification]) -> String {
    notifications
        .iter()
        .map(|n| {
            format!(
                "{}: {}",
                n.code.as_deref().unwrap_or("-"),
                n.message.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

impl AramexProvider {
    pub fn new(http: reqwest::Client, config: AramexConfig) -> Self {
        Self { http, config }
    }

    fn client_info(&self) -> Value {
        json!({
            "UserName": self.config.username,
            "Password": self.config.password,
            "Version": self.config.version,
            "AccountNumber": self.config.account_number,
            "AccountPin": self.config.account_pin,
            "AccountEntity": self.config.account_entity,
            "AccountCountryCode": self.config.account_country_code,
            "Source": self.config.source,
        })
    }

    pub fn rate_payload(&self, request: &RateRequest) -> Value {
        let (group, product_type) =
            product_codes(&self.config.account_country_code, &request.destination_country_code);
        json!({
            "ClientInfo": self.client_info(),
            "OriginAddress": {
                "CountryCode": self.config.account_country_code,
            },
            "DestinationAddress": {
                "City": request.destination_city,
                "PostCode": request.destination_post_code.clone().unwrap_or_default(),
                "CountryCode": request.destination_country_code,
            },
            "ShipmentDetails": {
                "PaymentType": "P",
                "ProductGroup": group,
                "ProductType": product_type,
                "ActualWeight": { "Value": grams_to_kg(request.weight_grams), "Unit": "KG" },
                "NumberOfPieces": 1,
            },
        })
    }

    /// The single CreateShipments payload used for every paid order.
    pub fn shipment_payload(&self, request: &ShipmentRequest) -> Value {
        let consignee = &request.consignee;
        let (group, product_type) =
            product_codes(&self.config.account_country_code, &consignee.country_code);
        let now = format!("/Date({})/", Utc::now().timestamp_millis());
        json!({
            "ClientInfo": self.client_info(),
            "LabelInfo": { "ReportID": 9201, "ReportType": "URL" },
            "Shipments": [{
                "Reference1": request.reference,
                "Shipper": {
                    "Reference1": request.reference,
                    "AccountNumber": self.config.account_number,
                    "PartyAddress": {
                        "Line1": request.shipper_name,
                        "City": "",
                        "CountryCode": self.config.account_country_code,
                    },
                    "Contact": {
                        "PersonName": request.shipper_name,
                        "CompanyName": request.shipper_name,
                        "PhoneNumber1": "",
                        "CellPhone": "",
                        "EmailAddress": "",
                    },
                },
                "Consignee": {
                    "Reference1": consignee.order_id.to_string(),
                    "Reference2": consignee.email,
                    "PartyAddress": {
                        "Line1": consignee.street_address,
                        "City": consignee.city,
                        "StateOrProvinceCode": consignee.state.clone().unwrap_or_default(),
                        "PostCode": consignee.post_code.clone().unwrap_or_default(),
                        "CountryCode": consignee.country_code,
                    },
                    "Contact": {
                        "PersonName": format!("{} {}", consignee.first_name, consignee.last_name),
                        "PhoneNumber1": consignee.phone,
                        "CellPhone": consignee.phone,
                        "EmailAddress": consignee.email,
                    },
                },
                "ShippingDateTime": now,
                "DueDate": now,
                "Details": {
                    "ActualWeight": { "Unit": "KG", "Value": grams_to_kg(request.weight_grams) },
                    "NumberOfPieces": 1,
                    "ProductGroup": group,
                    "ProductType": product_type,
                    "PaymentType": "P",
                    "Items": [],
                },
            }],
            "Transaction": null,
        })
    }
}

#[async_trait]
impl ShippingProvider for AramexProvider {
    fn name(&self) -> &'static str {
        "aramex"
    }

    async fn quote(&self, request: &RateRequest) -> AppResult<i64> {
        let response = self
            .http
            .post(format!(
                "{}/RateCalculator/Service_1_0.svc/json/CalculateRate",
                self.config.base_url
            ))
            .json(&self.rate_payload(request))
            .send()
            .await?;
        let rate: RateResponse = read_json(response, "aramex").await?;
        if rate.has_errors {
            return Err(AppError::BadRequest(format!(
                "Shipping is not available: {}",
                notifications_text(&rate.notifications)
            )));
        }
        let total = rate
            .total_amount
            .ok_or_else(|| AppError::Gateway("aramex returned no rate".into()))?;
        Ok(charged_amount(total.value))
    }

    async fn create_shipment(&self, request: &ShipmentRequest) -> AppResult<Shipment> {
        let response = self
            .http
            .post(format!(
                "{}/Shipping/Service_1_0.svc/json/CreateShipments",
                self.config.base_url
            ))
            .json(&self.shipment_payload(request))
            .send()
            .await?;
        let created: ShipmentResponse = read_json(response, "aramex").await?;
        if created.has_errors {
            return Err(AppError::Gateway(format!(
                "aramex shipment failed: {}",
                notifications_text(&created.notifications)
            )));
        }
        let shipment = created
            .shipments
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Gateway("aramex returned no shipment".into()))?;
        Ok(Shipment {
            tracking_no: shipment.id,
            label_url: shipment.shipment_label.and_then(|label| label.label_url),
        })
    }
}
