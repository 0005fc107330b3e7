use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::products::ProductList,
    dto::storefront::{VendorDirectory, VendorStorefront},
    error::AppResult,
    response::ApiResponse,
    routes::params::{StorefrontQuery, VendorQuery},
    services::storefront_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vendors))
        .route("/{slug}", get(vendor_storefront))
        .route("/{slug}/products", get(vendor_products))
}

#[utoipa::path(
    get,
    path = "/api/vendors",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Search display name and city"),
    ),
    responses(
        (status = 200, description = "Admitted vendors, newest first", body = ApiResponse<VendorDirectory>)
    ),
    tag = "Storefront"
)]
pub async fn list_vendors(
    State(state): State<AppState>,
    Query(query): Query<VendorQuery>,
) -> AppResult<Json<ApiResponse<VendorDirectory>>> {
    let resp = storefront_service::list_vendors(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vendors/{slug}",
    params(("slug" = String, Path, description = "Vendor slug")),
    responses(
        (status = 200, description = "Vendor profile and social links", body = ApiResponse<VendorStorefront>),
        (status = 404, description = "Not found"),
    ),
    tag = "Storefront"
)]
pub async fn vendor_storefront(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<VendorStorefront>>> {
    let resp = storefront_service::vendor_storefront(&state, &slug).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vendors/{slug}/products",
    params(
        ("slug" = String, Path, description = "Vendor slug"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("sort_by" = Option<String>, Query, description = "created_at, price, name or rating"),
        ("sort_order" = Option<String>, Query, description = "asc or desc, default desc"),
    ),
    responses(
        (status = 200, description = "Vendor's listed products", body = ApiResponse<ProductList>),
        (status = 404, description = "Not found"),
    ),
    tag = "Storefront"
)]
pub async fn vendor_products(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<StorefrontQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = storefront_service::vendor_products(&state, &slug, query).await?;
    Ok(Json(resp))
}
