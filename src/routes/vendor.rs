use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, patch, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::products::{AddSizeRequest, CreateProductRequest, ProductList, RatingList, UpdateProductRequest},
    dto::vendor::{
        BankAccountRequest, PayoutList, PayoutRequest, SocialLinksRequest, SplitList,
        VendorDashboard, VendorOrderDetail,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{BankAccount, Product, ProductSize, SocialLinks, VendorPayment},
    response::ApiResponse,
    routes::params::{OrderListQuery, Pagination},
    services::vendor_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", patch(update_product).delete(delete_product))
        .route("/products/{id}/sizes", post(add_size))
        .route("/products/{id}/sizes/{size_id}", delete(remove_size))
        .route("/orders", get(list_orders))
        .route("/orders/{id}", get(get_order))
        .route("/bank-account", get(bank_account).put(save_bank_account))
        .route("/social-links", get(social_links).put(save_social_links))
        .route("/payouts", get(payouts).post(request_payout))
        .route("/reviews", get(reviews))
}

#[utoipa::path(
    get,
    path = "/api/vendor/dashboard",
    responses(
        (status = 200, description = "Vendor stats and monthly chart", body = ApiResponse<VendorDashboard>),
        (status = 403, description = "Not an admitted vendor"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<VendorDashboard>>> {
    let resp = vendor_service::dashboard(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vendor/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "Own products", body = ApiResponse<ProductList>),
        (status = 403, description = "Not an admitted vendor"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = vendor_service::list_products(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/vendor/products",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Product created", body = ApiResponse<Product>),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Not an admitted vendor"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    payload.validate()?;
    let resp = vendor_service::create_product(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/vendor/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<Product>),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    payload.validate()?;
    let resp = vendor_service::update_product(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/vendor/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = vendor_service::delete_product(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/vendor/products/{id}/sizes",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = AddSizeRequest,
    responses(
        (status = 200, description = "Sizes after insert", body = ApiResponse<Vec<ProductSize>>),
        (status = 409, description = "Size already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn add_size(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddSizeRequest>,
) -> AppResult<Json<ApiResponse<Vec<ProductSize>>>> {
    payload.validate()?;
    let resp = vendor_service::add_size(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/vendor/products/{id}/sizes/{size_id}",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("size_id" = Uuid, Path, description = "Size ID"),
    ),
    responses(
        (status = 200, description = "Sizes after removal", body = ApiResponse<Vec<ProductSize>>),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn remove_size(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, size_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<Vec<ProductSize>>>> {
    let resp = vendor_service::remove_size(&state, &user, id, size_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vendor/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by split status"),
        ("sort_order" = Option<String>, Query, description = "asc or desc, default desc"),
    ),
    responses(
        (status = 200, description = "Order splits of this vendor", body = ApiResponse<SplitList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<SplitList>>> {
    let resp = vendor_service::list_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vendor/orders/{id}",
    params(("id" = Uuid, Path, description = "Order split ID")),
    responses(
        (status = 200, description = "Split with its lines and billing", body = ApiResponse<VendorOrderDetail>),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<VendorOrderDetail>>> {
    let resp = vendor_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vendor/bank-account",
    responses(
        (status = 200, description = "Bank account", body = ApiResponse<BankAccount>),
        (status = 404, description = "Not set yet"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn bank_account(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<BankAccount>>> {
    let resp = vendor_service::bank_account(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/vendor/bank-account",
    request_body = BankAccountRequest,
    responses(
        (status = 200, description = "Bank account saved", body = ApiResponse<BankAccount>),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn save_bank_account(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<BankAccountRequest>,
) -> AppResult<Json<ApiResponse<BankAccount>>> {
    payload.validate()?;
    let resp = vendor_service::save_bank_account(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vendor/social-links",
    responses(
        (status = 200, description = "Social links", body = ApiResponse<SocialLinks>),
        (status = 404, description = "Not set yet"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn social_links(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<SocialLinks>>> {
    let resp = vendor_service::social_links(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/vendor/social-links",
    request_body = SocialLinksRequest,
    responses(
        (status = 200, description = "Social links saved", body = ApiResponse<SocialLinks>),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn save_social_links(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SocialLinksRequest>,
) -> AppResult<Json<ApiResponse<SocialLinks>>> {
    payload.validate()?;
    let resp = vendor_service::save_social_links(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vendor/payouts",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "Payout requests", body = ApiResponse<PayoutList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn payouts(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<PayoutList>>> {
    let resp = vendor_service::payouts(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/vendor/payouts",
    request_body = PayoutRequest,
    responses(
        (status = 200, description = "Payout requested", body = ApiResponse<VendorPayment>),
        (status = 400, description = "Amount exceeds balance"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn request_payout(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PayoutRequest>,
) -> AppResult<Json<ApiResponse<VendorPayment>>> {
    payload.validate()?;
    let resp = vendor_service::request_payout(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vendor/reviews",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "Ratings on own products", body = ApiResponse<RatingList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn reviews(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<RatingList>>> {
    let resp = vendor_service::reviews(&state, &user, pagination).await?;
    Ok(Json(resp))
}
