use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::products::{ProductList, RateProductRequest, RatingList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{ProductDetail, ProductRating},
    response::ApiResponse,
    routes::params::{Pagination, ProductQuery},
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/{slug}", get(get_product))
        .route("/{slug}/ratings", get(list_ratings))
        .route("/{slug}/rate", post(rate_product))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Search in name and description"),
        ("category" = Option<String>, Query, description = "Category slug, includes subcategories"),
        ("vendor" = Option<String>, Query, description = "Vendor slug"),
        ("min_price" = Option<i64>, Query, description = "Minimum effective price in minor units"),
        ("max_price" = Option<i64>, Query, description = "Maximum effective price in minor units"),
        ("on_sale" = Option<bool>, Query, description = "Only discounted products"),
        ("promotional" = Option<String>, Query, description = "new or hot"),
        ("sort_by" = Option<String>, Query, description = "created_at, price, name or rating"),
        ("sort_order" = Option<String>, Query, description = "asc or desc"),
    ),
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{slug}",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product detail", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let resp = product_service::get_product(&state, &slug).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{slug}/ratings",
    params(
        ("slug" = String, Path, description = "Product slug"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "Product ratings", body = ApiResponse<RatingList>),
        (status = 404, description = "Not found"),
    ),
    tag = "Products"
)]
pub async fn list_ratings(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<RatingList>>> {
    let resp = product_service::list_ratings(&state, &slug, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products/{slug}/rate",
    params(("slug" = String, Path, description = "Product slug")),
    request_body = RateProductRequest,
    responses(
        (status = 200, description = "Rating saved", body = ApiResponse<ProductRating>),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn rate_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
    Json(payload): Json<RateProductRequest>,
) -> AppResult<Json<ApiResponse<ProductRating>>> {
    payload.validate()?;
    let resp = product_service::rate_product(&state, &user, &slug, payload).await?;
    Ok(Json(resp))
}
