use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::admin::{
        CouponList, CouponRequest, InventoryAdjustRequest, UpdateCouponRequest,
        UpdateOrderStatusRequest, UpdatePayoutRequest, VendorList,
    },
    dto::vendor::PayoutList,
    dto::orders::{OrderList, OrderWithItems},
    dto::products::ProductList,
    entity::{
        Coupons, OrderSuppliers, Orders, Products, Profiles, Users, VendorPayments,
        coupons::{self, Column as CouponCol},
        order_suppliers::Column as SplitCol,
        orders::{self, Column as OrderCol},
        products::{self, Column as ProdCol},
        profiles::{self, Column as ProfileCol},
        users::Column as UserCol,
        vendor_payments::{self, Column as PayoutCol},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{
        Coupon, PayoutStatus, Product, Profile, Role, VendorPayment, coupon_from_entity,
        order_from_entity, product_from_entity, profile_from_entity, vendor_payment_from_entity,
    },
    response::{ApiResponse, Meta},
    routes::params::{AdminOrderQuery, LowStockQuery, Pagination, PayoutQuery, SortOrder},
    services::{order_service::order_with_items, vendor_service::soft_delete},
    state::AppState,
};

pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: AdminOrderQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        let status: crate::models::OrderStatus = status.parse()?;
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }
    if let Some(finished) = query.finished {
        condition = condition.add(OrderCol::IsFinished.eq(finished));
    }

    let mut finder = Orders::find().filter(condition);

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_admin(user)?;
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let data = order_with_items(&state.orm, order).await?;
    Ok(ApiResponse::success("Order", data, Some(Meta::empty())))
}

/// Sets the order status and mirrors it on every vendor split.
pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;

    let order = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if !order.is_finished {
        return Err(AppError::BadRequest("Order has not been placed yet".into()));
    }

    let previous = order.status.clone();
    let mut active: orders::ActiveModel = order.into();
    active.status = Set(payload.status.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    let mut splits = OrderSuppliers::update_many()
        .col_expr(SplitCol::Status, Expr::value(payload.status.as_str()))
        .col_expr(SplitCol::UpdatedAt, Expr::value(Utc::now()));
    if payload.status.marks_finished() {
        splits = splits.col_expr(SplitCol::IsFinished, Expr::value(true));
    }
    splits
        .filter(SplitCol::OrderId.eq(order.id))
        .exec(&txn)
        .await?;

    let data = order_with_items(&txn, order).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": id, "from": previous, "to": payload.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order status updated",
        data,
        Some(Meta::empty()),
    ))
}

pub async fn list_coupons(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CouponList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();
    let finder = Coupons::find().order_by_desc(CouponCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(coupon_from_entity)
        .collect();
    Ok(ApiResponse::success(
        "Coupons",
        CouponList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn create_coupon(
    state: &AppState,
    user: &AuthUser,
    payload: CouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(user)?;
    if payload.valid_from > payload.valid_to {
        return Err(AppError::BadRequest("valid_from must be before valid_to".into()));
    }
    let code = payload.code.trim().to_string();
    let taken = Coupons::find()
        .filter(CouponCol::Code.eq(code.as_str()))
        .count(&state.orm)
        .await?;
    if taken > 0 {
        return Err(AppError::Conflict(format!("Coupon {code} already exists")));
    }

    let coupon = coupons::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code),
        valid_from: Set(payload.valid_from.into()),
        valid_to: Set(payload.valid_to.into()),
        discount: Set(payload.discount),
        active: Set(payload.active.unwrap_or(true)),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "coupon_create",
        "coupons",
        serde_json::json!({ "coupon_id": coupon.id, "code": coupon.code }),
    )
    .await;

    Ok(ApiResponse::success(
        "Coupon created",
        coupon_from_entity(coupon),
        Some(Meta::empty()),
    ))
}

pub async fn update_coupon(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(user)?;
    let coupon = Coupons::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let valid_from = payload
        .valid_from
        .unwrap_or_else(|| coupon.valid_from.with_timezone(&Utc));
    let valid_to = payload
        .valid_to
        .unwrap_or_else(|| coupon.valid_to.with_timezone(&Utc));
    if valid_from > valid_to {
        return Err(AppError::BadRequest("valid_from must be before valid_to".into()));
    }

    let mut active: coupons::ActiveModel = coupon.into();
    active.valid_from = Set(valid_from.into());
    active.valid_to = Set(valid_to.into());
    if let Some(discount) = payload.discount {
        active.discount = Set(discount);
    }
    if let Some(flag) = payload.active {
        active.active = Set(flag);
    }
    let coupon = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "coupon_update",
        "coupons",
        serde_json::json!({ "coupon_id": coupon.id, "discount": coupon.discount, "active": coupon.active }),
    )
    .await;

    Ok(ApiResponse::success(
        "Coupon updated",
        coupon_from_entity(coupon),
        Some(Meta::empty()),
    ))
}

pub async fn delete_coupon(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;
    let res = Coupons::delete_by_id(id).exec(&state.orm).await?;
    if res.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "coupon_delete",
        "coupons",
        serde_json::json!({ "coupon_id": id }),
    )
    .await;

    Ok(ApiResponse::message("Coupon deleted"))
}

pub async fn vendor_applications(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<VendorList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();
    let finder = Profiles::find()
        .filter(ProfileCol::Status.eq(Role::Vendor.as_str()))
        .filter(ProfileCol::Admission.eq(false))
        .order_by_asc(ProfileCol::UpdatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(profile_from_entity)
        .collect();
    Ok(ApiResponse::success(
        "Vendor applications",
        VendorList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn admit_vendor(
    state: &AppState,
    user: &AuthUser,
    profile_id: Uuid,
) -> AppResult<ApiResponse<Profile>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;
    let profile = Profiles::find_by_id(profile_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if profile.status != Role::Vendor.as_str() {
        return Err(AppError::BadRequest("Profile has not applied as a vendor".into()));
    }

    let mut active: profiles::ActiveModel = profile.into();
    active.admission = Set(true);
    active.updated_at = Set(Utc::now().into());
    let profile = active.update(&txn).await?;

    Users::update_many()
        .col_expr(UserCol::Role, Expr::value(Role::Vendor.as_str()))
        .filter(UserCol::Id.eq(profile.user_id))
        .filter(UserCol::Role.eq(Role::Customer.as_str()))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "vendor_admit",
        "profiles",
        serde_json::json!({ "profile_id": profile.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Vendor admitted",
        profile_from_entity(profile),
        Some(Meta::empty()),
    ))
}

pub async fn list_payouts(
    state: &AppState,
    user: &AuthUser,
    query: PayoutQuery,
) -> AppResult<ApiResponse<PayoutList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();
    let mut finder = VendorPayments::find().order_by_desc(PayoutCol::CreatedAt);
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        let status: PayoutStatus = status.parse()?;
        finder = finder.filter(PayoutCol::Status.eq(status.as_str()));
    }
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(vendor_payment_from_entity)
        .collect();
    Ok(ApiResponse::success(
        "Payouts",
        PayoutList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Moving a payout to refunded returns its amount to the vendor wallet once.
pub async fn update_payout(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdatePayoutRequest,
) -> AppResult<ApiResponse<VendorPayment>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;
    let payout = VendorPayments::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let previous: PayoutStatus = payout.status.parse()?;
    if previous == PayoutStatus::Refunded && payload.status != PayoutStatus::Refunded {
        return Err(AppError::BadRequest("A refunded payout cannot be reopened".into()));
    }
    let refund = payload.status == PayoutStatus::Refunded && previous != PayoutStatus::Refunded;

    let vendor_id = payout.vendor_id;
    let amount = payout.request_amount;
    let mut active: vendor_payments::ActiveModel = payout.into();
    active.status = Set(payload.status.as_str().to_string());
    if let Some(fee) = payload.fee {
        active.fee = Set(fee);
    }
    if let Some(comment) = payload.comment {
        active.comment = Set(Some(comment));
    }
    active.updated_at = Set(Utc::now().into());
    let payout = active.update(&txn).await?;

    if refund {
        Profiles::update_many()
            .col_expr(ProfileCol::Balance, Expr::col(ProfileCol::Balance).add(amount))
            .col_expr(ProfileCol::Requested, Expr::value(0i64))
            .col_expr(ProfileCol::UpdatedAt, Expr::value(Utc::now()))
            .filter(ProfileCol::Id.eq(vendor_id))
            .exec(&txn)
            .await?;
    }
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "payout_update",
        "vendor_payments",
        serde_json::json!({ "payout_id": id, "from": previous, "to": payload.status, "refunded": refund }),
    )
    .await;

    Ok(ApiResponse::success(
        "Payout updated",
        vendor_payment_from_entity(payout),
        Some(Meta::empty()),
    ))
}

pub async fn low_stock_products(
    state: &AppState,
    user: &AuthUser,
    query: LowStockQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();
    let threshold = query.threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);

    let finder = Products::find()
        .filter(ProdCol::Available.lte(threshold))
        .filter(ProdCol::IsDeleted.eq(false))
        .order_by_asc(ProdCol::Available);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Low stock products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn adjust_inventory(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: InventoryAdjustRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    if payload.delta == 0 {
        return Err(AppError::BadRequest("Delta must not be zero".into()));
    }

    let txn = state.orm.begin().await?;
    let product = Products::find_by_id(product_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let available = product
        .available
        .checked_add(payload.delta)
        .ok_or_else(|| AppError::BadRequest("Stock adjustment is out of range".into()))?;
    if available < 0 {
        return Err(AppError::BadRequest("Stock cannot be negative".into()));
    }

    let mut active: products::ActiveModel = product.into();
    active.available = Set(available);
    active.updated_at = Set(Utc::now().into());
    let product = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "inventory_adjust",
        "products",
        serde_json::json!({ "product_id": product.id, "delta": payload.delta }),
    )
    .await;

    Ok(ApiResponse::success(
        "Inventory updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;
    let product = Products::find_by_id(product_id)
        .filter(ProdCol::IsDeleted.eq(false))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    soft_delete(&state.orm, product).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        "products",
        serde_json::json!({ "product_id": product_id, "by": "admin" }),
    )
    .await;

    Ok(ApiResponse::message("Product deleted"))
}
