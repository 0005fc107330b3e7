mod common;

use chrono::{Duration, Utc};
use marketplace_api::{
    dto::{
        admin::{CouponRequest, InventoryAdjustRequest, UpdateOrderStatusRequest},
        cart::ApplyCouponRequest,
    },
    entity::{Coupons, OrderSuppliers, Orders, Products, coupons, order_suppliers, products},
    error::AppError,
    models::OrderStatus,
    services::{admin_service, cart_service},
};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

#[tokio::test]
async fn lines_from_two_vendors_fan_out_into_splits() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let admin = common::admin_user(&state).await?;
    let north = common::admitted_vendor(&state, &admin, "north@example.com").await?;
    let south = common::admitted_vendor(&state, &admin, "south@example.com").await?;
    let mug = common::listed_product(&state, &north, "Mug", 700, 10).await?;
    let plate = common::listed_product(&state, &north, "Plate", 300, 10).await?;
    let lamp = common::listed_product(&state, &south, "Lamp", 2500, 10).await?;
    let buyer = common::customer(&common::register(&state, "buyer@example.com", None).await?);

    common::add_line(&state, &buyer, mug.id, 2).await?;
    common::add_line(&state, &buyer, plate.id, 1).await?;
    let cart = common::add_line(&state, &buyer, lamp.id, 1).await?;

    assert_eq!(cart.lines.len(), 3);
    assert_eq!(cart.order.sub_total, 1400 + 300 + 2500);
    assert_eq!(cart.suppliers.len(), 2);
    let north_split = cart
        .suppliers
        .iter()
        .find(|s| s.vendor_id == mug.vendor_id)
        .ok_or_else(|| anyhow::anyhow!("north split missing"))?;
    let south_split = cart
        .suppliers
        .iter()
        .find(|s| s.vendor_id == lamp.vendor_id)
        .ok_or_else(|| anyhow::anyhow!("south split missing"))?;
    assert_eq!(north_split.sub_total, 1700);
    assert_eq!(north_split.amount, 1700);
    assert_eq!(north_split.weight_grams, 300);
    assert_eq!(south_split.amount, 2500);

    // Adding the same product again merges into one line.
    let cart = common::add_line(&state, &buyer, mug.id, 1).await?;
    assert_eq!(cart.lines.len(), 3);
    let north_split = cart
        .suppliers
        .iter()
        .find(|s| s.vendor_id == mug.vendor_id)
        .ok_or_else(|| anyhow::anyhow!("north split missing"))?;
    assert_eq!(north_split.amount, 2400);

    Ok(())
}

#[tokio::test]
async fn removing_lines_drops_empty_splits_then_the_cart() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let admin = common::admin_user(&state).await?;
    let north = common::admitted_vendor(&state, &admin, "north@example.com").await?;
    let south = common::admitted_vendor(&state, &admin, "south@example.com").await?;
    let mug = common::listed_product(&state, &north, "Mug", 700, 10).await?;
    let lamp = common::listed_product(&state, &south, "Lamp", 2500, 10).await?;
    let buyer = common::customer(&common::register(&state, "buyer@example.com", None).await?);

    common::add_line(&state, &buyer, mug.id, 1).await?;
    let cart = common::add_line(&state, &buyer, lamp.id, 1).await?;
    let order_id = cart.order.id;
    let lamp_line = cart
        .lines
        .iter()
        .find(|l| l.product_id == lamp.id)
        .ok_or_else(|| anyhow::anyhow!("lamp line missing"))?
        .id;

    let cart = cart_service::remove_cart_item(&state, &buyer, lamp_line)
        .await?
        .data
        .unwrap();
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.suppliers.len(), 1);
    assert_eq!(cart.suppliers[0].vendor_id, mug.vendor_id);
    assert_eq!(cart.order.sub_total, 700);
    let south_splits = OrderSuppliers::find()
        .filter(order_suppliers::Column::OrderId.eq(order_id))
        .filter(order_suppliers::Column::VendorId.eq(lamp.vendor_id))
        .count(&state.orm)
        .await?;
    assert_eq!(south_splits, 0);

    let last = cart.lines[0].id;
    let resp = cart_service::remove_cart_item(&state, &buyer, last).await?;
    assert!(resp.data.is_none());
    assert!(Orders::find_by_id(order_id).one(&state.orm).await?.is_none());
    assert!(cart_service::view_cart(&state, &buyer).await?.data.is_none());

    Ok(())
}

#[tokio::test]
async fn coupons_discount_the_cart_until_they_expire() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let admin = common::admin_user(&state).await?;
    let vendor = common::admitted_vendor(&state, &admin, "vendor@example.com").await?;
    let mug = common::listed_product(&state, &vendor, "Mug", 1000, 10).await?;
    let buyer = common::customer(&common::register(&state, "buyer@example.com", None).await?);

    let now = Utc::now();
    admin_service::create_coupon(
        &state,
        &admin,
        CouponRequest {
            code: "SPRING10".into(),
            valid_from: now - Duration::days(1),
            valid_to: now + Duration::days(1),
            discount: 10,
            active: None,
        },
    )
    .await?;

    // No cart yet.
    assert!(
        cart_service::apply_coupon(&state, &buyer, ApplyCouponRequest { code: "SPRING10".into() })
            .await
            .is_err()
    );

    common::add_line(&state, &buyer, mug.id, 2).await?;
    let unknown =
        cart_service::apply_coupon(&state, &buyer, ApplyCouponRequest { code: "NOPE".into() }).await;
    assert!(matches!(unknown, Err(AppError::BadRequest(_))));

    let cart = cart_service::apply_coupon(
        &state,
        &buyer,
        ApplyCouponRequest {
            code: "SPRING10".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(cart.order.discount, 200);
    assert_eq!(cart.order.amount, 1800);
    assert_eq!(cart.coupon.as_ref().map(|c| c.code.as_str()), Some("SPRING10"));

    let cart = cart_service::remove_coupon(&state, &buyer).await?.data.unwrap();
    assert_eq!(cart.order.discount, 0);
    assert_eq!(cart.order.amount, 2000);
    assert!(cart.coupon.is_none());

    cart_service::apply_coupon(
        &state,
        &buyer,
        ApplyCouponRequest {
            code: "SPRING10".into(),
        },
    )
    .await?;
    Coupons::update_many()
        .col_expr(coupons::Column::ValidTo, Expr::value(now - Duration::hours(1)))
        .filter(coupons::Column::Code.eq("SPRING10"))
        .exec(&state.orm)
        .await?;

    // The next recompute detaches the expired coupon.
    let cart = common::add_line(&state, &buyer, mug.id, 1).await?;
    assert!(cart.coupon.is_none());
    assert!(cart.order.coupon_id.is_none());
    assert_eq!(cart.order.discount, 0);
    assert_eq!(cart.order.amount, 3000);

    Ok(())
}

#[tokio::test]
async fn open_carts_have_no_fulfilment_status() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let admin = common::admin_user(&state).await?;
    let vendor = common::admitted_vendor(&state, &admin, "vendor@example.com").await?;
    let mug = common::listed_product(&state, &vendor, "Mug", 1000, 10).await?;
    let buyer = common::customer(&common::register(&state, "buyer@example.com", None).await?);
    let cart = common::add_line(&state, &buyer, mug.id, 1).await?;

    let result = admin_service::update_order_status(
        &state,
        &admin,
        cart.order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Complete,
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let order = Orders::find_by_id(cart.order.id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("cart missing"))?;
    assert_eq!(order.status, OrderStatus::Pending.as_str());
    assert!(!order.is_finished);
    assert_eq!(common::available(&state, mug.id).await?, 10);

    Ok(())
}

#[tokio::test]
async fn inventory_adjustments_stay_in_range() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let admin = common::admin_user(&state).await?;
    let vendor = common::admitted_vendor(&state, &admin, "vendor@example.com").await?;
    let mug = common::listed_product(&state, &vendor, "Mug", 1000, 10).await?;

    let below_zero = admin_service::adjust_inventory(
        &state,
        &admin,
        mug.id,
        InventoryAdjustRequest { delta: -11 },
    )
    .await;
    assert!(matches!(below_zero, Err(AppError::BadRequest(_))));

    Products::update_many()
        .col_expr(products::Column::Available, Expr::value(i32::MAX))
        .filter(products::Column::Id.eq(mug.id))
        .exec(&state.orm)
        .await?;
    let overflow =
        admin_service::adjust_inventory(&state, &admin, mug.id, InventoryAdjustRequest { delta: 1 })
            .await;
    assert!(matches!(overflow, Err(AppError::BadRequest(_))));
    assert_eq!(common::available(&state, mug.id).await?, i32::MAX);

    let restocked = admin_service::adjust_inventory(
        &state,
        &admin,
        mug.id,
        InventoryAdjustRequest { delta: -5 },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(restocked.available, i32::MAX - 5);

    Ok(())
}
