use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{ProductList, RateProductRequest, RatingList},
    entity::{
        ProductRatings, ProductSizes, Products, Profiles,
        product_ratings::{self, Column as RatingCol},
        product_sizes::Column as SizeCol,
        products::{self, Column as ProdCol},
        profiles::Column as ProfileCol,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{
        ProductDetail, ProductRating, Promotional, product_from_entity, rating_from_entity,
        size_from_entity,
    },
    pricing,
    response::{ApiResponse, Meta},
    routes::params::{Pagination, ProductQuery, ProductSortBy, SortOrder},
    services::category_service,
    state::AppState,
};

pub(crate) async fn product_slug_taken<C: ConnectionTrait>(db: &C, slug: String) -> AppResult<bool> {
    Ok(Products::find()
        .filter(ProdCol::Slug.eq(slug))
        .count(db)
        .await?
        > 0)
}

/// Active, non-deleted product or 404.
pub(crate) async fn find_listed<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<products::Model> {
    Products::find_by_id(id)
        .filter(ProdCol::IsActive.eq(true))
        .filter(ProdCol::IsDeleted.eq(false))
        .one(db)
        .await?
        .ok_or(AppError::NotFound)
}

/// Newest first unless the caller picks a column and direction.
pub(crate) fn sorted(
    finder: Select<Products>,
    sort_by: Option<ProductSortBy>,
    sort_order: Option<SortOrder>,
) -> Select<Products> {
    let sort_col = match sort_by.unwrap_or(ProductSortBy::CreatedAt) {
        ProductSortBy::CreatedAt => ProdCol::CreatedAt,
        ProductSortBy::Price => ProdCol::Price,
        ProductSortBy::Name => ProdCol::Name,
        ProductSortBy::Rating => ProdCol::RatingAverage,
    };
    match sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    }
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all()
        .add(ProdCol::IsActive.eq(true))
        .add(ProdCol::IsDeleted.eq(false));

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(ProdCol::Name).ilike(pattern.clone()))
                .add(Expr::col(ProdCol::Description).ilike(pattern.clone()))
                .add(Expr::col(ProdCol::Tags).ilike(pattern)),
        );
    }

    if let Some(slug) = query.category.as_ref().filter(|s| !s.is_empty()) {
        let ids = category_service::subtree_ids_by_slug(&state.orm, slug).await?;
        condition = condition.add(ProdCol::CategoryId.is_in(ids));
    }

    if let Some(slug) = query.vendor.as_ref().filter(|s| !s.is_empty()) {
        let vendor = Profiles::find()
            .filter(ProfileCol::Slug.eq(slug.as_str()))
            .one(&state.orm)
            .await?;
        condition = condition.add(ProdCol::VendorId.eq(vendor.map(|v| v.id).unwrap_or_else(Uuid::nil)));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(ProdCol::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(ProdCol::Price.lte(max_price));
    }

    if let Some(on_sale) = query.on_sale {
        condition = condition.add(ProdCol::OnSale.eq(on_sale));
    }

    if let Some(promotional) = query.promotional.as_ref().filter(|s| !s.is_empty()) {
        let promotional: Promotional = promotional.parse()?;
        condition = condition.add(ProdCol::Promotional.eq(promotional.as_str()));
    }

    let finder = sorted(Products::find().filter(condition), query.sort_by, query.sort_order);

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
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

async fn find_listed_by_slug<C: ConnectionTrait>(db: &C, slug: &str) -> AppResult<products::Model> {
    Products::find()
        .filter(ProdCol::Slug.eq(slug))
        .filter(ProdCol::IsActive.eq(true))
        .filter(ProdCol::IsDeleted.eq(false))
        .one(db)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn get_product(state: &AppState, slug: &str) -> AppResult<ApiResponse<ProductDetail>> {
    let product = find_listed_by_slug(&state.orm, slug).await?;

    let sizes = ProductSizes::find()
        .filter(SizeCol::ProductId.eq(product.id))
        .order_by_asc(SizeCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(size_from_entity)
        .collect();

    let vendor = Profiles::find_by_id(product.vendor_id).one(&state.orm).await?;

    Ok(ApiResponse::success(
        "Product",
        ProductDetail {
            product: product_from_entity(product),
            sizes,
            vendor_name: vendor.as_ref().and_then(|v| v.display_name.clone()),
            vendor_slug: vendor.map(|v| v.slug),
        },
        Some(Meta::empty()),
    ))
}

/// Creates or replaces the caller's rating and refreshes the product aggregate.
pub async fn rate_product(
    state: &AppState,
    user: &AuthUser,
    slug: &str,
    payload: RateProductRequest,
) -> AppResult<ApiResponse<ProductRating>> {
    let txn = state.orm.begin().await?;
    let product = find_listed_by_slug(&txn, slug).await?;

    let existing = ProductRatings::find()
        .filter(RatingCol::ProductId.eq(product.id))
        .filter(RatingCol::ClientId.eq(user.user_id))
        .one(&txn)
        .await?;

    let rating = match existing {
        Some(rating) => {
            let mut active: product_ratings::ActiveModel = rating.into();
            active.rate = Set(payload.rate);
            active.comment = Set(payload.comment);
            active.updated_at = Set(Utc::now().into());
            active.update(&txn).await?
        }
        None => {
            product_ratings::ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(product.id),
                vendor_id: Set(product.vendor_id),
                client_id: Set(user.user_id),
                rate: Set(payload.rate),
                comment: Set(payload.comment),
                active: Set(true),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(&txn)
            .await?
        }
    };

    let (sum, count) = ProductRatings::find()
        .select_only()
        .column_as(Expr::col(RatingCol::Rate).sum(), "sum")
        .column_as(Expr::col(RatingCol::Id).count(), "count")
        .filter(RatingCol::ProductId.eq(product.id))
        .filter(RatingCol::Active.eq(true))
        .into_tuple::<(Option<i64>, i64)>()
        .one(&txn)
        .await?
        .unwrap_or((None, 0));

    Products::update_many()
        .col_expr(
            ProdCol::RatingAverage,
            Expr::value(pricing::rating_average(sum.unwrap_or(0), count)),
        )
        .col_expr(ProdCol::RatingCount, Expr::value(count as i32))
        .filter(ProdCol::Id.eq(product.id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_rate",
        "product_ratings",
        serde_json::json!({ "product_id": product.id, "rate": rating.rate }),
    )
    .await;

    Ok(ApiResponse::success(
        "Rating saved",
        rating_from_entity(rating),
        Some(Meta::empty()),
    ))
}

pub async fn list_ratings(
    state: &AppState,
    slug: &str,
    pagination: Pagination,
) -> AppResult<ApiResponse<RatingList>> {
    let (page, limit, offset) = pagination.normalize();
    let product = find_listed_by_slug(&state.orm, slug).await?;
    let finder = ProductRatings::find()
        .filter(RatingCol::ProductId.eq(product.id))
        .filter(RatingCol::Active.eq(true))
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
        "Ratings",
        RatingList { items },
        Some(Meta::new(page, limit, total)),
    ))
}
