use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::cart::{AddToCartRequest, ApplyCouponRequest, CartView},
    entity::{
        Coupons, OrderDetails, OrderDetailsSuppliers, OrderSuppliers, Orders, ProductSizes,
        Products, Users, coupons,
        order_details::{self, Column as DetailCol},
        order_details_suppliers::{self, Column as MirrorCol},
        order_suppliers::{self, Column as SplitCol},
        orders::{self, Column as OrderCol},
        product_sizes::Column as SizeCol,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{
        OrderLine, OrderStatus, OrderSupplier, coupon_from_entity, order_from_entity,
        order_line_from_entity, order_supplier_from_entity,
    },
    pricing::{self, Line},
    response::{ApiResponse, Meta},
    services::product_service,
    state::AppState,
};

/// Whether a coupon can be attached at `now`.
pub fn coupon_applies(coupon: &coupons::Model, now: DateTime<Utc>) -> bool {
    coupon.active
        && coupon.valid_from.with_timezone(&Utc) <= now
        && now <= coupon.valid_to.with_timezone(&Utc)
}

/// The caller's unfinished order, row-locked for the rest of the transaction.
pub(crate) async fn locked_cart<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> AppResult<Option<orders::Model>> {
    Ok(Orders::find()
        .filter(OrderCol::UserId.eq(user_id))
        .filter(OrderCol::IsFinished.eq(false))
        .lock(LockType::Update)
        .one(db)
        .await?)
}

async fn cart_or_create<C: ConnectionTrait>(db: &C, user_id: Uuid) -> AppResult<orders::Model> {
    if let Some(order) = locked_cart(db, user_id).await? {
        return Ok(order);
    }
    let email = Users::find_by_id(user_id)
        .one(db)
        .await?
        .map(|u| u.email);

    Ok(orders::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(Some(user_id)),
        email_client: Set(email),
        coupon_id: Set(None),
        sub_total: Set(0),
        discount: Set(0),
        shipping: Set(0),
        amount: Set(0),
        weight_grams: Set(0),
        tracking_no: Set(None),
        label_url: Set(None),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        is_finished: Set(false),
        payment_method: Set(None),
        payment_reference: Set(None),
        gateway_order_ref: Set(None),
        gateway_amount: Set(None),
        merchant_order_id: Set(None),
        paid_at: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(db)
    .await?)
}

fn as_line(detail: &order_details::Model) -> Line {
    Line {
        price: detail.price,
        quantity: detail.quantity,
        weight_grams: detail.weight_grams,
    }
}

/// Recomputes one vendor split from its lines.
pub(crate) async fn recompute_split<C: ConnectionTrait>(
    db: &C,
    order_id: Uuid,
    vendor_id: Uuid,
) -> AppResult<()> {
    let details = OrderDetails::find()
        .filter(DetailCol::OrderId.eq(order_id))
        .filter(DetailCol::SupplierId.eq(vendor_id))
        .all(db)
        .await?;
    let totals = pricing::sum_lines(details.iter().map(as_line));

    OrderSuppliers::update_many()
        .col_expr(SplitCol::SubTotal, Expr::value(totals.sub_total))
        .col_expr(SplitCol::Amount, Expr::value(totals.sub_total))
        .col_expr(SplitCol::WeightGrams, Expr::value(totals.weight_grams))
        .col_expr(SplitCol::UpdatedAt, Expr::value(Utc::now()))
        .filter(SplitCol::OrderId.eq(order_id))
        .filter(SplitCol::VendorId.eq(vendor_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Recomputes order totals; a coupon that no longer applies is detached.
pub(crate) async fn recompute_order<C: ConnectionTrait>(
    db: &C,
    order: orders::Model,
) -> AppResult<orders::Model> {
    let details = OrderDetails::find()
        .filter(DetailCol::OrderId.eq(order.id))
        .all(db)
        .await?;
    let totals = pricing::sum_lines(details.iter().map(as_line));

    let coupon = match order.coupon_id {
        Some(id) => Coupons::find_by_id(id)
            .one(db)
            .await?
            .filter(|c| coupon_applies(c, Utc::now())),
        None => None,
    };
    let discount = coupon
        .as_ref()
        .map(|c| pricing::discount_for(totals.sub_total, c.discount))
        .unwrap_or(0);
    let amount = pricing::order_amount(totals.sub_total, discount, order.shipping);

    let mut active: orders::ActiveModel = order.into();
    active.coupon_id = Set(coupon.map(|c| c.id));
    active.sub_total = Set(totals.sub_total);
    active.weight_grams = Set(totals.weight_grams);
    active.discount = Set(discount);
    active.amount = Set(amount);
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

pub(crate) async fn order_lines<C: ConnectionTrait>(db: &C, order_id: Uuid) -> AppResult<Vec<OrderLine>> {
    Ok(OrderDetails::find()
        .filter(DetailCol::OrderId.eq(order_id))
        .order_by_asc(DetailCol::CreatedAt)
        .find_also_related(Products)
        .all(db)
        .await?
        .into_iter()
        .map(|(detail, product)| order_line_from_entity(detail, product))
        .collect())
}

pub(crate) async fn order_splits<C: ConnectionTrait>(
    db: &C,
    order_id: Uuid,
) -> AppResult<Vec<OrderSupplier>> {
    Ok(OrderSuppliers::find()
        .filter(SplitCol::OrderId.eq(order_id))
        .order_by_asc(SplitCol::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(order_supplier_from_entity)
        .collect())
}

async fn cart_view<C: ConnectionTrait>(db: &C, order: orders::Model) -> AppResult<CartView> {
    let lines = order_lines(db, order.id).await?;
    let suppliers = order_splits(db, order.id).await?;
    let coupon = match order.coupon_id {
        Some(id) => Coupons::find_by_id(id).one(db).await?.map(coupon_from_entity),
        None => None,
    };
    Ok(CartView {
        order: order_from_entity(order),
        lines,
        suppliers,
        coupon,
    })
}

fn normalize_size(size: Option<String>) -> Option<String> {
    size.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    let txn = state.orm.begin().await?;

    let product = product_service::find_listed(&txn, payload.product_id).await?;
    let size = normalize_size(payload.size);
    if let Some(size) = &size {
        let known = ProductSizes::find()
            .filter(SizeCol::ProductId.eq(product.id))
            .filter(SizeCol::Name.eq(size.as_str()))
            .count(&txn)
            .await?;
        if known == 0 {
            return Err(AppError::BadRequest(format!("Unknown size {size}")));
        }
    }
    // Rejects out-of-stock products before a cart row is created.
    pricing::requested_quantity(payload.quantity, product.available)?;

    let order = cart_or_create(&txn, user.user_id).await?;

    let mut line = OrderDetails::find()
        .filter(DetailCol::OrderId.eq(order.id))
        .filter(DetailCol::ProductId.eq(product.id));
    line = match &size {
        Some(size) => line.filter(DetailCol::Size.eq(size.as_str())),
        None => line.filter(DetailCol::Size.is_null()),
    };

    match line.one(&txn).await? {
        Some(detail) => {
            let quantity =
                pricing::merged_quantity(detail.quantity, payload.quantity, product.available)?;
            OrderDetailsSuppliers::update_many()
                .col_expr(MirrorCol::Quantity, Expr::value(quantity))
                .filter(MirrorCol::OrderDetailId.eq(detail.id))
                .exec(&txn)
                .await?;
            let mut active: order_details::ActiveModel = detail.into();
            active.quantity = Set(quantity);
            active.update(&txn).await?;
        }
        None => {
            let quantity = pricing::requested_quantity(payload.quantity, product.available)?;
            let price =
                pricing::effective_price(product.price, product.discount_price, product.on_sale);

            let detail = order_details::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order.id),
                product_id: Set(product.id),
                supplier_id: Set(product.vendor_id),
                price: Set(price),
                quantity: Set(quantity),
                size: Set(size.clone()),
                weight_grams: Set(product.weight_grams),
                created_at: NotSet,
            }
            .insert(&txn)
            .await?;

            let split = OrderSuppliers::find()
                .filter(SplitCol::OrderId.eq(order.id))
                .filter(SplitCol::VendorId.eq(product.vendor_id))
                .one(&txn)
                .await?;
            let split = match split {
                Some(split) => split,
                None => {
                    order_suppliers::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        order_id: Set(order.id),
                        vendor_id: Set(product.vendor_id),
                        user_id: Set(order.user_id),
                        email_client: Set(order.email_client.clone()),
                        sub_total: Set(0),
                        amount: Set(0),
                        weight_grams: Set(0),
                        status: Set(OrderStatus::Pending.as_str().to_string()),
                        is_finished: Set(false),
                        created_at: NotSet,
                        updated_at: NotSet,
                    }
                    .insert(&txn)
                    .await?
                }
            };

            order_details_suppliers::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_supplier_id: Set(split.id),
                order_detail_id: Set(detail.id),
                order_id: Set(order.id),
                product_id: Set(product.id),
                price: Set(price),
                quantity: Set(quantity),
                size: Set(size),
                weight_grams: Set(product.weight_grams),
                created_at: NotSet,
            }
            .insert(&txn)
            .await?;
        }
    }

    recompute_split(&txn, order.id, product.vendor_id).await?;
    let order = recompute_order(&txn, order).await?;
    let view = cart_view(&txn, order).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "cart_add",
        "orders",
        serde_json::json!({ "product_id": product.id, "quantity": payload.quantity }),
    )
    .await;

    Ok(ApiResponse::success("Added to cart", view, Some(Meta::empty())))
}

pub async fn view_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let txn = state.orm.begin().await?;
    let Some(order) = locked_cart(&txn, user.user_id).await? else {
        return Ok(ApiResponse::message("Cart is empty"));
    };
    let lines = OrderDetails::find()
        .filter(DetailCol::OrderId.eq(order.id))
        .count(&txn)
        .await?;
    if lines == 0 {
        return Ok(ApiResponse::message("Cart is empty"));
    }

    let order = recompute_order(&txn, order).await?;
    let view = cart_view(&txn, order).await?;
    txn.commit().await?;
    Ok(ApiResponse::success("Cart", view, Some(Meta::empty())))
}

pub async fn remove_cart_item(
    state: &AppState,
    user: &AuthUser,
    detail_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    let txn = state.orm.begin().await?;
    let order = locked_cart(&txn, user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let detail = OrderDetails::find_by_id(detail_id)
        .filter(DetailCol::OrderId.eq(order.id))
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let lines = OrderDetails::find()
        .filter(DetailCol::OrderId.eq(order.id))
        .count(&txn)
        .await?;
    if lines <= 1 {
        order.delete(&txn).await?;
        txn.commit().await?;
        return Ok(ApiResponse::message("Cart is empty"));
    }

    let vendor_id = detail.supplier_id;
    OrderDetailsSuppliers::delete_many()
        .filter(MirrorCol::OrderDetailId.eq(detail.id))
        .exec(&txn)
        .await?;
    detail.delete(&txn).await?;

    let remaining = OrderDetails::find()
        .filter(DetailCol::OrderId.eq(order.id))
        .filter(DetailCol::SupplierId.eq(vendor_id))
        .count(&txn)
        .await?;
    if remaining == 0 {
        OrderSuppliers::delete_many()
            .filter(SplitCol::OrderId.eq(order.id))
            .filter(SplitCol::VendorId.eq(vendor_id))
            .exec(&txn)
            .await?;
    } else {
        recompute_split(&txn, order.id, vendor_id).await?;
    }

    let order = recompute_order(&txn, order).await?;
    let view = cart_view(&txn, order).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "cart_remove",
        "orders",
        serde_json::json!({ "order_detail_id": detail_id }),
    )
    .await;

    Ok(ApiResponse::success("Item removed", view, Some(Meta::empty())))
}

pub async fn apply_coupon(
    state: &AppState,
    user: &AuthUser,
    payload: ApplyCouponRequest,
) -> AppResult<ApiResponse<CartView>> {
    let txn = state.orm.begin().await?;
    let order = locked_cart(&txn, user.user_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Cart is empty".into()))?;

    let coupon = Coupons::find()
        .filter(coupons::Column::Code.eq(payload.code.trim()))
        .one(&txn)
        .await?
        .filter(|c| coupon_applies(c, Utc::now()))
        .ok_or_else(|| AppError::BadRequest("Coupon is invalid or expired".into()))?;

    let mut active: orders::ActiveModel = order.into();
    active.coupon_id = Set(Some(coupon.id));
    let order = active.update(&txn).await?;

    let order = recompute_order(&txn, order).await?;
    let view = cart_view(&txn, order).await?;
    txn.commit().await?;
    Ok(ApiResponse::success("Coupon applied", view, Some(Meta::empty())))
}

pub async fn remove_coupon(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let txn = state.orm.begin().await?;
    let order = locked_cart(&txn, user.user_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Cart is empty".into()))?;

    let mut active: orders::ActiveModel = order.into();
    active.coupon_id = Set(None);
    let order = active.update(&txn).await?;

    let order = recompute_order(&txn, order).await?;
    let view = cart_view(&txn, order).await?;
    txn.commit().await?;
    Ok(ApiResponse::success("Coupon removed", view, Some(Meta::empty())))
}
