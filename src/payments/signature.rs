use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// Seconds a Stripe signature timestamp may drift from the server clock.
pub const STRIPE_TOLERANCE_SECS: u64 = 300;

pub fn hmac_sha256_hex(secret: &str, message: &str) -> AppResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn verify_hex(secret: &str, message: &str, signature_hex: &str) -> bool {
    let Ok(expected) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(message.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

/// Checks a `Stripe-Signature` header (`t=<unix>,v1=<hex>[,v1=...]`).
pub fn verify_stripe_signature(
    header: &str,
    payload: &str,
    secret: &str,
    now_unix: i64,
) -> AppResult<()> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<&str> = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| AppError::BadRequest("Missing signature timestamp".into()))?;
    if signatures.is_empty() {
        return Err(AppError::BadRequest("Missing v1 signature".into()));
    }
    if now_unix.abs_diff(timestamp) > STRIPE_TOLERANCE_SECS {
        return Err(AppError::BadRequest("Signature timestamp outside tolerance".into()));
    }

    let signed_payload = format!("{timestamp}.{payload}");
    if signatures
        .iter()
        .any(|sig| verify_hex(secret, &signed_payload, sig))
    {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid webhook signature".into()))
    }
}

/// Razorpay checkout signature: HMAC-SHA256 of `order_id|payment_id`.
pub fn verify_razorpay_signature(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    key_secret: &str,
) -> bool {
    verify_hex(key_secret, &format!("{order_id}|{payment_id}"), signature)
}
