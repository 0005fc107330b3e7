mod common;

use marketplace_api::{
    dto::{
        admin::{UpdateOrderStatusRequest, UpdatePayoutRequest},
        cart::AddToCartRequest,
        products::CreateProductRequest,
        vendor::PayoutRequest,
    },
    entity::{Profiles, SiteSettings, profiles, site_settings},
    middleware::auth::AuthUser,
    models::{OrderStatus, PaymentMethod, PayoutMethod, PayoutStatus},
    routes::params::LowStockQuery,
    services::{
        admin_service, auth_service, cart_service, checkout_service, order_service,
        vendor_service,
    },
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use common::register;
use uuid::Uuid;

// Vendor onboarding, cart, checkout with cash and wallet, referral credit, payouts.
#[tokio::test]
async fn vendor_sale_checkout_and_payout_flow() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    site_settings::ActiveModel {
        id: Set(Uuid::new_v4()),
        site_name: Set("Test Market".into()),
        site_title: Set("Test".into()),
        description: Set(String::new()),
        site_url: Set(None),
        shipping_fee: Set(300),
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    assert_eq!(SiteSettings::find().all(&state.orm).await?.len(), 1);

    let admin = AuthUser {
        user_id: common::register(&state, "admin@example.com", None).await?.user.id,
        role: "admin".into(),
    };
    let buyer_account = common::register(&state, "buyer@example.com", None).await?;
    let buyer = common::customer(&buyer_account);
    let friend_account = register(
        &state,
        "friend@example.com",
        Some(buyer_account.profile.referral_code.clone()),
    )
    .await?;
    assert_eq!(friend_account.profile.recommended_by, Some(buyer.user_id));
    let friend = common::customer(&friend_account);

    // Vendor applies and is admitted.
    let vendor_account = common::register(&state, "vendor@example.com", None).await?;
    let vendor = AuthUser {
        user_id: vendor_account.user.id,
        role: "vendor".into(),
    };
    let applied = auth_service::apply_vendor(&state, &vendor).await?.data.unwrap();
    assert_eq!(applied.profile.status, "vendor");
    assert!(!applied.profile.admission);
    assert!(vendor_service::dashboard(&state, &vendor).await.is_err());

    let admitted = admin_service::admit_vendor(&state, &admin, applied.profile.id)
        .await?
        .data
        .unwrap();
    assert!(admitted.admission);

    let product = vendor_service::create_product(
        &state,
        &vendor,
        CreateProductRequest {
            name: "Crab Tee".into(),
            description: "Cotton tee".into(),
            content: None,
            price: 1000,
            discount_price: None,
            weight_grams: Some(200),
            available: 5,
            sku: None,
            on_sale: None,
            promotional: None,
            tags: None,
            category_id: None,
            image_url: None,
            sizes: vec!["M".into()],
        },
    )
    .await?
    .data
    .unwrap();

    // Unknown size is refused.
    let bad_size = cart_service::add_to_cart(
        &state,
        &buyer,
        AddToCartRequest {
            product_id: product.id,
            quantity: 1,
            size: Some("XXL".into()),
        },
    )
    .await;
    assert!(bad_size.is_err());

    // Buyer pays cash.
    let cart = cart_service::add_to_cart(
        &state,
        &buyer,
        AddToCartRequest {
            product_id: product.id,
            quantity: 2,
            size: Some("M".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(cart.order.sub_total, 2000);
    assert_eq!(cart.suppliers.len(), 1);
    assert_eq!(cart.suppliers[0].amount, 2000);

    let summary = checkout_service::submit_billing(&state, &buyer, common::billing("buyer@example.com"))
        .await?
        .data
        .unwrap();
    assert_eq!(summary.order.shipping, 300);
    assert_eq!(summary.order.amount, 2300);
    assert!(summary.payment_methods.contains(&PaymentMethod::Cash));

    let placed = checkout_service::pay_cash(&state, &buyer).await?.data.unwrap();
    assert!(placed.order.is_finished);
    assert_eq!(placed.order.status, OrderStatus::Underway.as_str());
    assert_eq!(placed.order.payment_method.as_deref(), Some("cash"));
    assert!(placed.suppliers.iter().all(|s| s.is_finished));

    assert_eq!(common::available(&state, product.id).await?, 3);
    assert_eq!(common::balance(&state, vendor.user_id).await?, 2000);

    // Finalizing again changes nothing.
    let again = order_service::finalize_order(
        &state,
        placed.order.id,
        order_service::Settlement::direct(PaymentMethod::Cash),
    )
    .await?;
    assert!(matches!(again, order_service::Finalized::Settled(_)));
    assert_eq!(common::available(&state, product.id).await?, 3);
    assert_eq!(common::balance(&state, vendor.user_id).await?, 2000);

    // Cart is empty after checkout.
    let empty = cart_service::view_cart(&state, &buyer).await?;
    assert!(empty.data.is_none());

    // Friend pays from the wallet; the buyer earns a referral commission.
    assert!(checkout_service::pay_with_balance(&state, &friend).await.is_err());
    Profiles::update_many()
        .col_expr(profiles::Column::Balance, sea_orm::sea_query::Expr::value(10_000_i64))
        .filter(profiles::Column::UserId.eq(friend.user_id))
        .exec(&state.orm)
        .await?;
    cart_service::add_to_cart(
        &state,
        &friend,
        AddToCartRequest {
            product_id: product.id,
            quantity: 1,
            size: Some("M".into()),
        },
    )
    .await?;
    checkout_service::submit_billing(&state, &friend, common::billing("friend@example.com")).await?;
    let wallet_order = checkout_service::pay_with_balance(&state, &friend)
        .await?
        .data
        .unwrap();
    assert_eq!(wallet_order.order.amount, 1300);
    assert_eq!(common::balance(&state, friend.user_id).await?, 8700);
    assert_eq!(common::balance(&state, buyer.user_id).await?, 32);
    assert_eq!(common::balance(&state, vendor.user_id).await?, 3000);
    assert_eq!(common::available(&state, product.id).await?, 2);

    // Admin status change reaches the vendor split.
    let updated = admin_service::update_order_status(
        &state,
        &admin,
        placed.order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Complete,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.order.status, "complete");
    assert!(updated.suppliers.iter().all(|s| s.status == "complete"));

    let low = admin_service::low_stock_products(
        &state,
        &admin,
        LowStockQuery {
            page: Some(1),
            per_page: Some(20),
            threshold: Some(5),
        },
    )
    .await?;
    assert!(low.data.unwrap().items.iter().any(|p| p.id == product.id));

    // Payout request holds the amount; a refund returns it exactly once.
    assert!(
        vendor_service::request_payout(
            &state,
            &vendor,
            PayoutRequest {
                amount: 5000,
                method: PayoutMethod::Bank,
                description: None,
            },
        )
        .await
        .is_err()
    );
    let payout = vendor_service::request_payout(
        &state,
        &vendor,
        PayoutRequest {
            amount: 500,
            method: PayoutMethod::Bank,
            description: Some("weekly".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(common::balance(&state, vendor.user_id).await?, 2500);
    assert_eq!(common::requested(&state, vendor.user_id).await?, 500);

    for _ in 0..2 {
        admin_service::update_payout(&state, &admin, payout.id, refund()).await?;
    }
    assert_eq!(common::balance(&state, vendor.user_id).await?, 3000);
    assert_eq!(common::requested(&state, vendor.user_id).await?, 0);

    let reopen = admin_service::update_payout(
        &state,
        &admin,
        payout.id,
        UpdatePayoutRequest {
            status: PayoutStatus::Paid,
            fee: None,
            comment: None,
        },
    )
    .await;
    assert!(reopen.is_err());

    Ok(())
}

fn refund() -> UpdatePayoutRequest {
    UpdatePayoutRequest {
        status: PayoutStatus::Refunded,
        fee: None,
        comment: Some("returned".into()),
    }
}
