use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::{
    dto::products::ProductList,
    dto::storefront::{VendorDirectory, VendorStorefront},
    entity::{
        Products, Profiles, SocialLinks,
        products::Column as ProdCol,
        profiles::{self, Column as ProfileCol},
        social_links::Column as SocialCol,
    },
    error::{AppError, AppResult},
    models::{Role, product_from_entity, social_links_from_entity, vendor_card_from_entity},
    response::{ApiResponse, Meta},
    routes::params::{StorefrontQuery, VendorQuery},
    services::product_service,
    state::AppState,
};

fn admitted() -> Condition {
    Condition::all()
        .add(ProfileCol::Status.eq(Role::Vendor.as_str()))
        .add(ProfileCol::Admission.eq(true))
}

fn listed_by(vendor: &profiles::Model) -> Condition {
    Condition::all()
        .add(ProdCol::VendorId.eq(vendor.id))
        .add(ProdCol::IsActive.eq(true))
        .add(ProdCol::IsDeleted.eq(false))
}

/// Admitted vendor by slug. Applicants awaiting admission are not public.
async fn storefront_vendor<C: ConnectionTrait>(db: &C, slug: &str) -> AppResult<profiles::Model> {
    Profiles::find()
        .filter(admitted())
        .filter(ProfileCol::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn list_vendors(
    state: &AppState,
    query: VendorQuery,
) -> AppResult<ApiResponse<VendorDirectory>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = admitted();
    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(ProfileCol::DisplayName).ilike(pattern.clone()))
                .add(Expr::col(ProfileCol::City).ilike(pattern)),
        );
    }

    let finder = Profiles::find()
        .filter(condition)
        .order_by_desc(ProfileCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(vendor_card_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Vendors",
        VendorDirectory { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn vendor_storefront(
    state: &AppState,
    slug: &str,
) -> AppResult<ApiResponse<VendorStorefront>> {
    let vendor = storefront_vendor(&state.orm, slug).await?;
    let social_links = SocialLinks::find()
        .filter(SocialCol::VendorId.eq(vendor.id))
        .one(&state.orm)
        .await?
        .map(social_links_from_entity);
    let product_count = Products::find()
        .filter(listed_by(&vendor))
        .count(&state.orm)
        .await? as i64;

    Ok(ApiResponse::success(
        "Vendor",
        VendorStorefront {
            vendor: vendor_card_from_entity(vendor),
            social_links,
            product_count,
        },
        Some(Meta::empty()),
    ))
}

pub async fn vendor_products(
    state: &AppState,
    slug: &str,
    query: StorefrontQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let vendor = storefront_vendor(&state.orm, slug).await?;

    let finder = product_service::sorted(
        Products::find().filter(listed_by(&vendor)),
        query.sort_by,
        query.sort_order,
    );
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
        "Vendor products",
        ProductList { items },
        Some(Meta::new(page, limit, total)),
    ))
}
