use axum::http::{HeaderMap, HeaderValue, header};
use marketplace_api::{
    dto::{
        admin::InventoryAdjustRequest, cart::AddToCartRequest, checkout::WebhookAck,
        products::UpdateProductRequest,
    },
    mail,
    payments::{myfatoorah::PaymentStatus, paymob::PaymobTransaction, stripe::StripeEvent},
    routes::blog::view_context,
};
use uuid::Uuid;
use validator::Validate;

#[test]
fn view_context_prefers_first_forwarded_hop() {
    let mut headers = HeaderMap::new();
    headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.5, 10.0.0.1"));
    headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.9"));
    headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.0"));
    headers.insert(header::REFERER, HeaderValue::from_static("https://news.example"));

    let view = view_context(&headers);
    assert_eq!(view.ip.as_deref(), Some("203.0.113.5"));
    assert_eq!(view.user_agent.as_deref(), Some("curl/8.0"));
    assert_eq!(view.referral.as_deref(), Some("https://news.example"));
}

#[test]
fn view_context_falls_back_to_real_ip() {
    let mut headers = HeaderMap::new();
    headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.7"));

    let view = view_context(&headers);
    assert_eq!(view.ip.as_deref(), Some("198.51.100.7"));
    assert!(view.user_agent.is_none());
    assert!(view.referral.is_none());
}

#[test]
fn mail_templates_mention_order_and_code() {
    let order_id = Uuid::new_v4();
    let placed = mail::order_placed("a@example.com", order_id, 2350);
    assert_eq!(placed.to, "a@example.com");
    assert!(placed.subject.contains(&order_id.to_string()));
    assert!(placed.body.contains("23.50"));

    let failed = mail::payment_failed("a@example.com", order_id);
    assert!(failed.subject.contains("failed"));

    let code = mail::login_code("a@example.com", "123456");
    assert!(code.body.contains("123456"));
}

#[test]
fn webhook_ack_serializes_status() {
    let ack = WebhookAck::new("processed");
    assert_eq!(serde_json::to_value(&ack).unwrap(), serde_json::json!({ "status": "processed" }));
}

#[test]
fn quantity_and_price_inputs_are_bounded() {
    let add = |quantity| AddToCartRequest {
        product_id: Uuid::new_v4(),
        quantity,
        size: None,
    };
    assert!(add(3).validate().is_ok());
    assert!(add(i32::MAX).validate().is_err());

    assert!(InventoryAdjustRequest { delta: -20 }.validate().is_ok());
    assert!(InventoryAdjustRequest { delta: i32::MAX }.validate().is_err());
    assert!(InventoryAdjustRequest { delta: i32::MIN }.validate().is_err());

    let update = UpdateProductRequest {
        price: Some(i64::MAX),
        ..Default::default()
    };
    assert!(update.validate().is_err());
}

#[test]
fn stripe_session_event_carries_payment_state() {
    let event: StripeEvent = serde_json::from_value(serde_json::json!({
        "id": "evt_1",
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": "cs_1",
            "payment_intent": "pi_1",
            "payment_status": "unpaid",
            "amount_total": 2300,
            "metadata": { "order_id": Uuid::nil().to_string() }
        }}
    }))
    .unwrap();
    let object = &event.data.object;
    assert!(!object.is_paid());
    assert_eq!(object.amount_total, Some(2300));
    assert_eq!(object.order_id(), Some(Uuid::nil()));

    let bare: StripeEvent = serde_json::from_value(serde_json::json!({
        "id": "evt_2",
        "type": "checkout.session.async_payment_failed",
        "data": { "object": { "id": "cs_2", "metadata": {} } }
    }))
    .unwrap();
    assert!(!bare.data.object.is_paid());
    assert!(bare.data.object.amount_total.is_none());
}

#[test]
fn gateway_status_payloads_report_charged_amounts() {
    let paid: PaymentStatus = serde_json::from_value(serde_json::json!({
        "InvoiceId": 77,
        "InvoiceStatus": "Paid",
        "InvoiceValue": 23.0
    }))
    .unwrap();
    assert!(paid.is_paid());
    assert_eq!(paid.charged_minor_units(), Some(2300));

    let missing: PaymentStatus = serde_json::from_value(serde_json::json!({
        "InvoiceId": 78,
        "InvoiceStatus": "Pending"
    }))
    .unwrap();
    assert!(missing.charged_minor_units().is_none());

    let transaction: PaymobTransaction = serde_json::from_value(serde_json::json!({
        "id": 9001,
        "success": true,
        "amount_cents": 1999,
        "order": { "id": 55 }
    }))
    .unwrap();
    assert_eq!(transaction.amount_cents, 1999);
}
