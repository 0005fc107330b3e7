mod common;

use marketplace_api::{
    models::Billing,
    shipping::{
        RateRequest, ShipmentRequest,
        aramex::{AramexProvider, charged_amount, product_codes},
    },
};
use uuid::Uuid;

fn provider() -> AramexProvider {
    AramexProvider::new(reqwest::Client::new(), common::aramex_config())
}

#[test]
fn domestic_shipments_use_domestic_codes() {
    assert_eq!(product_codes("JO", "jo"), ("DOM", "OND"));
    assert_eq!(product_codes("JO", "AE"), ("EXP", "PPX"));
}

#[test]
fn carrier_rate_is_marked_up() {
    assert_eq!(charged_amount(10.0), 1410);
    assert_eq!(charged_amount(7.5), 1058);
    assert_eq!(charged_amount(0.0), 0);
}

#[test]
fn rate_payload_carries_weight_in_kilograms() {
    let payload = provider().rate_payload(&RateRequest {
        weight_grams: 1500,
        destination_country_code: "AE".into(),
        destination_city: "Dubai".into(),
        destination_post_code: None,
    });

    let details = &payload["ShipmentDetails"];
    assert_eq!(details["ActualWeight"]["Value"], 1.5);
    assert_eq!(details["ProductGroup"], "EXP");
    assert_eq!(payload["DestinationAddress"]["City"], "Dubai");
    assert_eq!(payload["DestinationAddress"]["PostCode"], "");
    assert_eq!(payload["ClientInfo"]["AccountNumber"], "20016");
}

#[test]
fn shipment_payload_addresses_the_billing_contact() {
    let order_id = Uuid::new_v4();
    let billing = Billing {
        id: Uuid::new_v4(),
        order_id,
        first_name: "Lina".into(),
        last_name: "Haddad".into(),
        country: "Jordan".into(),
        country_code: "JO".into(),
        state: None,
        city: "Amman".into(),
        street_address: "Rainbow St 5".into(),
        post_code: Some("11118".into()),
        email: "lina@example.com".into(),
        phone: "+962700000000".into(),
        payment_method: Some("cash".into()),
    };

    let payload = provider().shipment_payload(&ShipmentRequest {
        reference: order_id.to_string(),
        weight_grams: 250,
        shipper_name: "Crab Goods".into(),
        consignee: billing,
    });

    let shipment = &payload["Shipments"][0];
    assert_eq!(shipment["Consignee"]["Contact"]["PersonName"], "Lina Haddad");
    assert_eq!(shipment["Consignee"]["PartyAddress"]["PostCode"], "11118");
    assert_eq!(shipment["Consignee"]["Reference1"], order_id.to_string());
    assert_eq!(shipment["Details"]["ProductGroup"], "DOM");
    assert_eq!(shipment["Details"]["ActualWeight"]["Value"], 0.25);
}
