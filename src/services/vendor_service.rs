//! Supplier panel: a vendor's own catalog, orders, wallet and storefront links.

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{
        AddSizeRequest, CreateProductRequest, ProductList, RatingList, UpdateProductRequest,
    },
    dto::vendor::{
        BankAccountRequest, DashboardStats, MonthlyChart, PayoutList, PayoutRequest, SocialLinksRequest,
        SplitList, VendorDashboard, VendorOrderDetail,
    },
    entity::{
        BankAccounts, OrderDetails, OrderSuppliers, ProductRatings, ProductSizes, Products, Profiles,
        SocialLinks, VendorPayments, bank_accounts,
        order_details::Column as DetailCol,
        order_suppliers::Column as SplitCol,
        product_ratings::Column as RatingCol,
        product_sizes::{self, Column as SizeCol},
        products::{self, Column as ProdCol},
        profiles::{self, Column as ProfileCol},
        social_links, vendor_payments,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{
        BankAccount, OrderStatus, PayoutStatus, Product, ProductSize, Role, SocialLinks as Links,
        bank_account_from_entity, billing_from_entity, order_line_from_entity,
        order_supplier_from_entity, product_from_entity, rating_from_entity, size_from_entity,
        social_links_from_entity, vendor_payment_from_entity,
    },
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, Pagination, SortOrder},
    services::{
        order_service::billing_for,
        product_service::product_slug_taken,
        report_service::{current_year, products_by_month, splits_by_month},
    },
    slugs,
    state::AppState,
};

/// The caller's profile when it is an admitted vendor.
pub(crate) async fn ensure_vendor<C: ConnectionTrait>(
    db: &C,
    user: &AuthUser,
) -> AppResult<profiles::Model> {
    let profile = Profiles::find()
        .filter(ProfileCol::UserId.eq(user.user_id))
        .one(db)
        .await?
        .ok_or(AppError::Forbidden)?;
    if profile.status != Role::Vendor.as_str() || !profile.admission {
        return Err(AppError::Forbidden);
    }
    Ok(profile)
}

async fn own_product<C: ConnectionTrait>(
    db: &C,
    vendor: &profiles::Model,
    product_id: Uuid,
) -> AppResult<products::Model> {
    Products::find_by_id(product_id)
        .filter(ProdCol::VendorId.eq(vendor.id))
        .filter(ProdCol::IsDeleted.eq(false))
        .one(db)
        .await?
        .ok_or(AppError::NotFound)
}

async fn sizes_of<C: ConnectionTrait>(db: &C, product_id: Uuid) -> AppResult<Vec<ProductSize>> {
    Ok(ProductSizes::find()
        .filter(SizeCol::ProductId.eq(product_id))
        .order_by_asc(SizeCol::Name)
        .all(db)
        .await?
        .into_iter()
        .map(size_from_entity)
        .collect())
}

pub async fn dashboard(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<VendorDashboard>> {
    let vendor = ensure_vendor(&state.orm, user).await?;

    let orders_count = OrderSuppliers::find()
        .filter(SplitCol::VendorId.eq(vendor.id))
        .filter(SplitCol::IsFinished.eq(true))
        .filter(SplitCol::Status.ne(OrderStatus::Pending.as_str()))
        .count(&state.orm)
        .await? as i64;
    let underway_count = OrderSuppliers::find()
        .filter(SplitCol::VendorId.eq(vendor.id))
        .filter(SplitCol::Status.eq(OrderStatus::Underway.as_str()))
        .count(&state.orm)
        .await? as i64;
    let products_count = Products::find()
        .filter(ProdCol::VendorId.eq(vendor.id))
        .filter(ProdCol::IsActive.eq(true))
        .filter(ProdCol::IsDeleted.eq(false))
        .count(&state.orm)
        .await? as i64;

    let year = current_year();
    let chart = MonthlyChart {
        year,
        products: products_by_month(&state.pool, year, Some(vendor.id)).await?,
        orders: splits_by_month(&state.pool, year, Some(vendor.id)).await?,
    };

    Ok(ApiResponse::success(
        "Dashboard",
        VendorDashboard {
            stats: DashboardStats {
                orders_count,
                underway_count,
                products_count,
                balance: vendor.balance,
                requested: vendor.requested,
            },
            chart,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_products(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<ProductList>> {
    let vendor = ensure_vendor(&state.orm, user).await?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Products::find()
        .filter(ProdCol::VendorId.eq(vendor.id))
        .filter(ProdCol::IsDeleted.eq(false))
        .order_by_desc(ProdCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let txn = state.orm.begin().await?;
    let vendor = ensure_vendor(&txn, user).await?;

    let db = &txn;
    let slug = slugs::unique_slug(&payload.name, |candidate| product_slug_taken(db, candidate)).await?;

    let product = products::ActiveModel {
        id: Set(Uuid::new_v4()),
        vendor_id: Set(vendor.id),
        category_id: Set(payload.category_id),
        name: Set(payload.name),
        description: Set(payload.description),
        content: Set(payload.content),
        price: Set(payload.price),
        discount_price: Set(payload.discount_price.unwrap_or(0)),
        weight_grams: Set(payload.weight_grams.unwrap_or(0)),
        available: Set(payload.available),
        sku: Set(payload.sku),
        on_sale: Set(payload.on_sale.unwrap_or(false)),
        promotional: Set(payload.promotional.map(|p| p.as_str().to_string())),
        is_active: Set(true),
        is_deleted: Set(false),
        tags: Set(payload.tags),
        image_url: Set(payload.image_url),
        slug: Set(slug),
        rating_average: Set(0),
        rating_count: Set(0),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut names: Vec<String> = payload
        .sizes
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    names.sort();
    names.dedup();
    for name in names {
        product_sizes::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product.id),
            name: Set(name),
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id, "vendor_id": vendor.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let vendor = ensure_vendor(&state.orm, user).await?;
    let product = own_product(&state.orm, &vendor, id).await?;

    let mut active: products::ActiveModel = product.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(content) = payload.content {
        active.content = Set(Some(content));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(discount_price) = payload.discount_price {
        active.discount_price = Set(discount_price);
    }
    if let Some(weight_grams) = payload.weight_grams {
        active.weight_grams = Set(weight_grams);
    }
    if let Some(available) = payload.available {
        active.available = Set(available);
    }
    if let Some(sku) = payload.sku {
        active.sku = Set(Some(sku));
    }
    if let Some(on_sale) = payload.on_sale {
        active.on_sale = Set(on_sale);
    }
    if let Some(promotional) = payload.promotional {
        active.promotional = Set(Some(promotional.as_str().to_string()));
    }
    if let Some(tags) = payload.tags {
        active.tags = Set(Some(tags));
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(Some(category_id));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().into());
    let product = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Product updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

/// Soft delete: the row stays for order history.
pub(crate) async fn soft_delete<C: ConnectionTrait>(db: &C, product: products::Model) -> AppResult<()> {
    let mut active: products::ActiveModel = product.into();
    active.is_deleted = Set(true);
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now().into());
    active.update(db).await?;
    Ok(())
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    let vendor = ensure_vendor(&state.orm, user).await?;
    let product = own_product(&state.orm, &vendor, id).await?;
    soft_delete(&state.orm, product).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::message("Product deleted"))
}

pub async fn add_size(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: AddSizeRequest,
) -> AppResult<ApiResponse<Vec<ProductSize>>> {
    let vendor = ensure_vendor(&state.orm, user).await?;
    let product = own_product(&state.orm, &vendor, product_id).await?;
    let name = payload.name.trim().to_string();

    let exists = ProductSizes::find()
        .filter(SizeCol::ProductId.eq(product.id))
        .filter(SizeCol::Name.eq(name.as_str()))
        .count(&state.orm)
        .await?;
    if exists > 0 {
        return Err(AppError::Conflict(format!("Size {name} already exists")));
    }

    product_sizes::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        name: Set(name),
    }
    .insert(&state.orm)
    .await?;

    let sizes = sizes_of(&state.orm, product.id).await?;
    Ok(ApiResponse::success("Size added", sizes, Some(Meta::empty())))
}

pub async fn remove_size(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    size_id: Uuid,
) -> AppResult<ApiResponse<Vec<ProductSize>>> {
    let vendor = ensure_vendor(&state.orm, user).await?;
    let product = own_product(&state.orm, &vendor, product_id).await?;

    let res = ProductSizes::delete_many()
        .filter(SizeCol::Id.eq(size_id))
        .filter(SizeCol::ProductId.eq(product.id))
        .exec(&state.orm)
        .await?;
    if res.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    let sizes = sizes_of(&state.orm, product.id).await?;
    Ok(ApiResponse::success("Size removed", sizes, Some(Meta::empty())))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<SplitList>> {
    let vendor = ensure_vendor(&state.orm, user).await?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all()
        .add(SplitCol::VendorId.eq(vendor.id))
        .add(SplitCol::IsFinished.eq(true));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        let status: OrderStatus = status.parse()?;
        condition = condition.add(SplitCol::Status.eq(status.as_str()));
    }

    let mut finder = OrderSuppliers::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(SplitCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(SplitCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_supplier_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Orders",
        SplitList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    split_id: Uuid,
) -> AppResult<ApiResponse<VendorOrderDetail>> {
    let vendor = ensure_vendor(&state.orm, user).await?;
    let split = OrderSuppliers::find_by_id(split_id)
        .filter(SplitCol::VendorId.eq(vendor.id))
        .filter(SplitCol::IsFinished.eq(true))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let lines = OrderDetails::find()
        .filter(DetailCol::OrderId.eq(split.order_id))
        .filter(DetailCol::SupplierId.eq(vendor.id))
        .order_by_asc(DetailCol::CreatedAt)
        .find_also_related(Products)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(detail, product)| order_line_from_entity(detail, product))
        .collect();
    let billing = billing_for(&state.orm, split.order_id)
        .await?
        .map(billing_from_entity);

    Ok(ApiResponse::success(
        "Order",
        VendorOrderDetail {
            split: order_supplier_from_entity(split),
            lines,
            billing,
        },
        Some(Meta::empty()),
    ))
}

pub async fn bank_account(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<BankAccount>> {
    let vendor = ensure_vendor(&state.orm, user).await?;
    match BankAccounts::find()
        .filter(bank_accounts::Column::VendorId.eq(vendor.id))
        .one(&state.orm)
        .await?
    {
        Some(account) => Ok(ApiResponse::success(
            "Bank account",
            bank_account_from_entity(account),
            Some(Meta::empty()),
        )),
        None => Ok(ApiResponse::message("No bank account saved")),
    }
}

pub async fn save_bank_account(
    state: &AppState,
    user: &AuthUser,
    payload: BankAccountRequest,
) -> AppResult<ApiResponse<BankAccount>> {
    let vendor = ensure_vendor(&state.orm, user).await?;
    let existing = BankAccounts::find()
        .filter(bank_accounts::Column::VendorId.eq(vendor.id))
        .one(&state.orm)
        .await?;

    let fill = |mut active: bank_accounts::ActiveModel| {
        active.bank_name = Set(payload.bank_name);
        active.account_number = Set(payload.account_number);
        active.swift_code = Set(payload.swift_code);
        active.account_name = Set(payload.account_name);
        active.country = Set(payload.country);
        active.paypal_email = Set(payload.paypal_email);
        active.description = Set(payload.description);
        active
    };
    let account = match existing {
        Some(account) => {
            let mut active = fill(account.into());
            active.updated_at = Set(Utc::now().into());
            active.update(&state.orm).await?
        }
        None => {
            fill(bank_accounts::ActiveModel {
                id: Set(Uuid::new_v4()),
                vendor_id: Set(vendor.id),
                created_at: NotSet,
                updated_at: NotSet,
                ..Default::default()
            })
            .insert(&state.orm)
            .await?
        }
    };

    Ok(ApiResponse::success(
        "Bank account saved",
        bank_account_from_entity(account),
        Some(Meta::empty()),
    ))
}

pub async fn social_links(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Links>> {
    let vendor = ensure_vendor(&state.orm, user).await?;
    match SocialLinks::find()
        .filter(social_links::Column::VendorId.eq(vendor.id))
        .one(&state.orm)
        .await?
    {
        Some(links) => Ok(ApiResponse::success(
            "Social links",
            social_links_from_entity(links),
            Some(Meta::empty()),
        )),
        None => Ok(ApiResponse::message("No social links saved")),
    }
}

pub async fn save_social_links(
    state: &AppState,
    user: &AuthUser,
    payload: SocialLinksRequest,
) -> AppResult<ApiResponse<Links>> {
    let vendor = ensure_vendor(&state.orm, user).await?;
    let existing = SocialLinks::find()
        .filter(social_links::Column::VendorId.eq(vendor.id))
        .one(&state.orm)
        .await?;

    let fill = |mut active: social_links::ActiveModel| {
        active.facebook = Set(payload.facebook);
        active.twitter = Set(payload.twitter);
        active.instagram = Set(payload.instagram);
        active.pinterest = Set(payload.pinterest);
        active.updated_at = Set(Utc::now().into());
        active
    };
    let links = match existing {
        Some(links) => fill(links.into()).update(&state.orm).await?,
        None => {
            fill(social_links::ActiveModel {
                id: Set(Uuid::new_v4()),
                vendor_id: Set(vendor.id),
                ..Default::default()
            })
            .insert(&state.orm)
            .await?
        }
    };

    Ok(ApiResponse::success(
        "Social links saved",
        social_links_from_entity(links),
        Some(Meta::empty()),
    ))
}

pub async fn payouts(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<PayoutList>> {
    let vendor = ensure_vendor(&state.orm, user).await?;
    let (page, limit, offset) = pagination.normalize();

    let finder = VendorPayments::find()
        .filter(vendor_payments::Column::VendorId.eq(vendor.id))
        .order_by_desc(vendor_payments::Column::CreatedAt);
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

pub async fn request_payout(
    state: &AppState,
    user: &AuthUser,
    payload: PayoutRequest,
) -> AppResult<ApiResponse<crate::models::VendorPayment>> {
    let txn = state.orm.begin().await?;
    ensure_vendor(&txn, user).await?;
    let vendor = Profiles::find()
        .filter(ProfileCol::UserId.eq(user.user_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::Forbidden)?;

    if payload.amount <= 0 {
        return Err(AppError::BadRequest("Amount must be positive".into()));
    }
    if payload.amount > vendor.balance {
        return Err(AppError::BadRequest("Amount exceeds available balance".into()));
    }

    Profiles::update_many()
        .col_expr(ProfileCol::Balance, Expr::col(ProfileCol::Balance).sub(payload.amount))
        .col_expr(ProfileCol::Requested, Expr::value(payload.amount))
        .col_expr(ProfileCol::UpdatedAt, Expr::value(Utc::now()))
        .filter(ProfileCol::Id.eq(vendor.id))
        .exec(&txn)
        .await?;

    let payout = vendor_payments::ActiveModel {
        id: Set(Uuid::new_v4()),
        vendor_id: Set(vendor.id),
        request_amount: Set(payload.amount),
        fee: Set(0),
        description: Set(payload.description),
        status: Set(PayoutStatus::Pending.as_str().to_string()),
        method: Set(payload.method.as_str().to_string()),
        comment: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "payout_request",
        "vendor_payments",
        serde_json::json!({ "payout_id": payout.id, "amount": payout.request_amount }),
    )
    .await;

    Ok(ApiResponse::success(
        "Payout requested",
        vendor_payment_from_entity(payout),
        Some(Meta::empty()),
    ))
}

pub async fn reviews(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<RatingList>> {
    let vendor = ensure_vendor(&state.orm, user).await?;
    let (page, limit, offset) = pagination.normalize();

    let finder = ProductRatings::find()
        .filter(RatingCol::VendorId.eq(vendor.id))
        .order_by_desc(RatingCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(rating_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Reviews",
        RatingList { items },
        Some(Meta::new(page, limit, total)),
    ))
}
