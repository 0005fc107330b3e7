mod common;

use chrono::Utc;
use marketplace_api::{
    config::{RazorpayConfig, StripeConfig},
    dto::checkout::RazorpayVerifyRequest,
    entity::{Orders, WebhookEvents, orders, webhook_events},
    error::AppError,
    middleware::auth::AuthUser,
    models::{Order, PaymentMethod},
    payments::signature::hmac_sha256_hex,
    services::{
        checkout_service,
        order_service::{self, Finalized, Settlement},
        webhook_service,
    },
    state::AppState,
};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

const WEBHOOK_SECRET: &str = "whsec_test";
const RAZORPAY_SECRET: &str = "rzp_secret";

fn with_gateways(config: &mut marketplace_api::config::AppConfig) {
    config.stripe = Some(StripeConfig {
        secret_key: "sk_test".into(),
        webhook_secret: WEBHOOK_SECRET.into(),
    });
    config.razorpay = Some(RazorpayConfig {
        key_id: "rzp_key".into(),
        key_secret: RAZORPAY_SECRET.into(),
    });
}

struct Shop {
    buyer: AuthUser,
    vendor: AuthUser,
    product_id: Uuid,
}

/// One admitted vendor with a 1000-unit product and a buyer.
async fn shop(state: &AppState) -> anyhow::Result<Shop> {
    let admin = common::admin_user(state).await?;
    let vendor = common::admitted_vendor(state, &admin, "vendor@example.com").await?;
    let product = common::listed_product(state, &vendor, "Mug", 1000, 10).await?;
    let buyer = common::customer(&common::register(state, "buyer@example.com", None).await?);
    Ok(Shop {
        buyer,
        vendor,
        product_id: product.id,
    })
}

/// Cart with billing saved, ready for a gateway.
async fn billed_cart(
    state: &AppState,
    buyer: &AuthUser,
    product_id: Uuid,
    quantity: i32,
) -> anyhow::Result<Order> {
    common::add_line(state, buyer, product_id, quantity).await?;
    let summary = checkout_service::submit_billing(state, buyer, common::billing("buyer@example.com"))
        .await?
        .data
        .unwrap();
    Ok(summary.order)
}

fn session_event(
    event_id: &str,
    event_type: &str,
    order_id: Uuid,
    payment_status: &str,
    amount_total: i64,
) -> String {
    serde_json::json!({
        "id": event_id,
        "type": event_type,
        "data": { "object": {
            "id": "cs_test_1",
            "payment_intent": "pi_test_1",
            "payment_status": payment_status,
            "amount_total": amount_total,
            "metadata": { "order_id": order_id.to_string() }
        }}
    })
    .to_string()
}

fn stripe_header(payload: &str) -> anyhow::Result<String> {
    let ts = Utc::now().timestamp();
    let signature = hmac_sha256_hex(WEBHOOK_SECRET, &format!("{ts}.{payload}"))?;
    Ok(format!("t={ts},v1={signature}"))
}

async fn deliver(state: &AppState, payload: &str) -> anyhow::Result<String> {
    let header = stripe_header(payload)?;
    let ack = webhook_service::stripe_webhook(state, Some(&header), payload).await?;
    Ok(ack.status)
}

async fn stored(state: &AppState, order_id: Uuid) -> anyhow::Result<orders::Model> {
    Orders::find_by_id(order_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("order missing"))
}

async fn recorded_events(state: &AppState, event_id: &str) -> anyhow::Result<u64> {
    Ok(WebhookEvents::find()
        .filter(webhook_events::Column::EventId.eq(event_id))
        .count(&state.orm)
        .await?)
}

#[tokio::test]
async fn repeated_stripe_event_settles_once() -> anyhow::Result<()> {
    let Some(state) = common::setup_state_with(with_gateways).await? else {
        return Ok(());
    };
    let shop = shop(&state).await?;
    let order = billed_cart(&state, &shop.buyer, shop.product_id, 2).await?;

    let payload = session_event(
        "evt_paid",
        webhook_service::STRIPE_COMPLETED,
        order.id,
        "paid",
        order.amount,
    );
    assert_eq!(deliver(&state, &payload).await?, "processed");
    let settled = stored(&state, order.id).await?;
    assert!(settled.is_finished);
    assert_eq!(settled.payment_method.as_deref(), Some("stripe"));
    assert_eq!(settled.payment_reference.as_deref(), Some("pi_test_1"));
    assert_eq!(common::balance(&state, shop.vendor.user_id).await?, 2000);
    assert_eq!(common::available(&state, shop.product_id).await?, 8);

    assert_eq!(deliver(&state, &payload).await?, "duplicate");
    assert_eq!(common::balance(&state, shop.vendor.user_id).await?, 2000);
    assert_eq!(common::available(&state, shop.product_id).await?, 8);
    assert_eq!(recorded_events(&state, "evt_paid").await?, 1);

    Ok(())
}

#[tokio::test]
async fn completed_session_without_payment_waits_for_async_success() -> anyhow::Result<()> {
    let Some(state) = common::setup_state_with(with_gateways).await? else {
        return Ok(());
    };
    let shop = shop(&state).await?;
    let order = billed_cart(&state, &shop.buyer, shop.product_id, 1).await?;

    let completed = session_event(
        "evt_completed",
        webhook_service::STRIPE_COMPLETED,
        order.id,
        "unpaid",
        order.amount,
    );
    assert_eq!(deliver(&state, &completed).await?, "pending");
    assert!(!stored(&state, order.id).await?.is_finished);
    assert_eq!(common::balance(&state, shop.vendor.user_id).await?, 0);
    assert_eq!(recorded_events(&state, "evt_completed").await?, 1);

    let succeeded = session_event(
        "evt_async_ok",
        webhook_service::STRIPE_ASYNC_SUCCEEDED,
        order.id,
        "paid",
        order.amount,
    );
    assert_eq!(deliver(&state, &succeeded).await?, "processed");
    assert!(stored(&state, order.id).await?.is_finished);
    assert_eq!(common::balance(&state, shop.vendor.user_id).await?, 1000);

    Ok(())
}

#[tokio::test]
async fn stripe_total_must_match_the_order() -> anyhow::Result<()> {
    let Some(state) = common::setup_state_with(with_gateways).await? else {
        return Ok(());
    };
    let shop = shop(&state).await?;
    let order = billed_cart(&state, &shop.buyer, shop.product_id, 2).await?;

    // Session priced before the cart grew.
    let payload = session_event(
        "evt_short",
        webhook_service::STRIPE_COMPLETED,
        order.id,
        "paid",
        order.amount - 1000,
    );
    let header = stripe_header(&payload)?;
    let result = webhook_service::stripe_webhook(&state, Some(&header), &payload).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let unchanged = stored(&state, order.id).await?;
    assert!(!unchanged.is_finished);
    assert!(unchanged.paid_at.is_none());
    assert_eq!(common::balance(&state, shop.vendor.user_id).await?, 0);
    assert_eq!(common::available(&state, shop.product_id).await?, 10);
    assert_eq!(recorded_events(&state, "evt_short").await?, 0);

    Ok(())
}

#[tokio::test]
async fn an_event_id_settles_only_one_order() -> anyhow::Result<()> {
    let Some(state) = common::setup_state_with(with_gateways).await? else {
        return Ok(());
    };
    let shop = shop(&state).await?;
    let first = billed_cart(&state, &shop.buyer, shop.product_id, 1).await?;

    let other = common::customer(&common::register(&state, "other@example.com", None).await?);
    common::add_line(&state, &other, shop.product_id, 1).await?;
    let second = checkout_service::submit_billing(&state, &other, common::billing("other@example.com"))
        .await?
        .data
        .unwrap()
        .order;

    let settle = |order: &Order| {
        Settlement::gateway(PaymentMethod::Stripe, "pi_shared", order.amount).with_event("evt_shared")
    };
    let outcome = order_service::finalize_order(&state, first.id, settle(&first)).await?;
    assert!(matches!(outcome, Finalized::Settled(_)));

    let outcome = order_service::finalize_order(&state, second.id, settle(&second)).await?;
    assert!(matches!(outcome, Finalized::DuplicateEvent));
    assert!(!stored(&state, second.id).await?.is_finished);
    assert_eq!(common::balance(&state, shop.vendor.user_id).await?, 1000);
    assert_eq!(common::available(&state, shop.product_id).await?, 9);
    assert_eq!(recorded_events(&state, "evt_shared").await?, 1);

    Ok(())
}

#[tokio::test]
async fn razorpay_payment_must_cover_the_current_cart() -> anyhow::Result<()> {
    let Some(state) = common::setup_state_with(with_gateways).await? else {
        return Ok(());
    };
    let shop = shop(&state).await?;
    let order = billed_cart(&state, &shop.buyer, shop.product_id, 1).await?;

    // Gateway order created for the cart as it was.
    Orders::update_many()
        .col_expr(orders::Column::GatewayOrderRef, Expr::value("order_rzp_1"))
        .col_expr(orders::Column::GatewayAmount, Expr::value(order.amount))
        .filter(orders::Column::Id.eq(order.id))
        .exec(&state.orm)
        .await?;
    common::add_line(&state, &shop.buyer, shop.product_id, 2).await?;

    let verify = || -> anyhow::Result<RazorpayVerifyRequest> {
        Ok(RazorpayVerifyRequest {
            razorpay_order_id: "order_rzp_1".into(),
            razorpay_payment_id: "pay_rzp_1".into(),
            razorpay_signature: hmac_sha256_hex(RAZORPAY_SECRET, "order_rzp_1|pay_rzp_1")?,
        })
    };

    let stale = checkout_service::razorpay_verify(&state, &shop.buyer, verify()?).await;
    assert!(matches!(stale, Err(AppError::BadRequest(_))));
    assert!(!stored(&state, order.id).await?.is_finished);
    assert_eq!(recorded_events(&state, "pay_rzp_1").await?, 0);

    let current = stored(&state, order.id).await?.amount;
    Orders::update_many()
        .col_expr(orders::Column::GatewayAmount, Expr::value(current))
        .filter(orders::Column::Id.eq(order.id))
        .exec(&state.orm)
        .await?;
    let placed = checkout_service::razorpay_verify(&state, &shop.buyer, verify()?)
        .await?
        .data
        .unwrap();
    assert!(placed.order.is_finished);
    assert_eq!(placed.order.payment_reference.as_deref(), Some("pay_rzp_1"));
    assert_eq!(common::balance(&state, shop.vendor.user_id).await?, 3000);
    assert_eq!(recorded_events(&state, "pay_rzp_1").await?, 1);

    Ok(())
}
