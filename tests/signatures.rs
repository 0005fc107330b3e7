use marketplace_api::payments::signature::{
    STRIPE_TOLERANCE_SECS, hmac_sha256_hex, verify_razorpay_signature, verify_stripe_signature,
};

const SECRET: &str = "whsec_test";
const PAYLOAD: &str = r#"{"id":"evt_1","type":"checkout.session.completed"}"#;

fn stripe_header(timestamp: i64, payload: &str) -> String {
    let sig = hmac_sha256_hex(SECRET, &format!("{timestamp}.{payload}")).unwrap();
    format!("t={timestamp},v1={sig}")
}

#[test]
fn stripe_signature_accepts_valid_header() {
    let ts = 1_700_000_000;
    let header = stripe_header(ts, PAYLOAD);
    assert!(verify_stripe_signature(&header, PAYLOAD, SECRET, ts + 10).is_ok());
}

#[test]
fn stripe_signature_accepts_any_matching_v1() {
    let ts = 1_700_000_000;
    let good = stripe_header(ts, PAYLOAD);
    let header = format!("t={ts},v1=deadbeef,{}", good.split_once(',').unwrap().1);
    assert!(verify_stripe_signature(&header, PAYLOAD, SECRET, ts).is_ok());
}

#[test]
fn stripe_signature_rejects_tampered_payload() {
    let ts = 1_700_000_000;
    let header = stripe_header(ts, PAYLOAD);
    let tampered = PAYLOAD.replace("evt_1", "evt_2");
    assert!(verify_stripe_signature(&header, &tampered, SECRET, ts).is_err());
}

#[test]
fn stripe_signature_rejects_stale_timestamp() {
    let ts = 1_700_000_000;
    let header = stripe_header(ts, PAYLOAD);
    assert!(
        verify_stripe_signature(&header, PAYLOAD, SECRET, ts + STRIPE_TOLERANCE_SECS as i64 + 1).is_err()
    );
}

#[test]
fn stripe_signature_rejects_extreme_timestamps() {
    let header = format!("t={},v1=abcd", i64::MIN);
    assert!(verify_stripe_signature(&header, PAYLOAD, SECRET, 1_700_000_000).is_err());
    let header = format!("t={},v1=abcd", i64::MAX);
    assert!(verify_stripe_signature(&header, PAYLOAD, SECRET, i64::MIN).is_err());
}

#[test]
fn stripe_signature_requires_timestamp_and_v1() {
    assert!(verify_stripe_signature("v1=abcd", PAYLOAD, SECRET, 0).is_err());
    assert!(verify_stripe_signature("t=0", PAYLOAD, SECRET, 0).is_err());
}

#[test]
fn razorpay_signature_covers_order_and_payment() {
    let sig = hmac_sha256_hex("rzp_secret", "order_1|pay_1").unwrap();
    assert!(verify_razorpay_signature("order_1", "pay_1", &sig, "rzp_secret"));
    assert!(!verify_razorpay_signature("order_1", "pay_2", &sig, "rzp_secret"));
    assert!(!verify_razorpay_signature("order_1", "pay_1", &sig, "other"));
    assert!(!verify_razorpay_signature("order_1", "pay_1", "not-hex", "rzp_secret"));
}
