use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, patch, post, put},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::admin::{
        CommentModerationRequest, CouponList, CouponRequest, InventoryAdjustRequest, SalesReport,
        SiteSettingsRequest, UpdateCouponRequest, UpdateOrderStatusRequest, UpdatePayoutRequest,
        VendorList,
    },
    dto::orders::{OrderList, OrderWithItems},
    dto::products::ProductList,
    dto::vendor::PayoutList,
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Comment, Coupon, PostReportDay, Product, Profile, SiteSettings, VendorPayment},
    response::ApiResponse,
    routes::{
        categories, pages,
        params::{AdminOrderQuery, LowStockQuery, Pagination, PayoutQuery},
    },
    services::{admin_service, blog_service, report_service, site_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_all_orders))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", patch(update_order_status))
        .route("/coupons", get(list_coupons).post(create_coupon))
        .route("/coupons/{id}", patch(update_coupon).delete(delete_coupon))
        .route("/vendors/applications", get(vendor_applications))
        .route("/vendors/{id}/admit", post(admit_vendor))
        .route("/payouts", get(list_payouts))
        .route("/payouts/{id}", patch(update_payout))
        .route("/inventory/low-stock", get(low_stock_products))
        .route("/inventory/{id}", patch(adjust_inventory))
        .route("/products/{id}", delete(delete_product))
        .route("/reports/sales", get(sales_report))
        .route("/settings", put(update_settings))
        .route("/comments/{id}", patch(moderate_comment))
        .route("/posts/{id}/report", get(post_report))
        .nest("/categories", categories::admin_router())
        .nest("/pages", pages::admin_router())
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by order status"),
        ("finished" = Option<bool>, Query, description = "true for placed orders, false for open carts"),
        ("sort_order" = Option<String>, Query, description = "asc or desc, default desc"),
    ),
    responses(
        (status = 200, description = "List all orders", body = ApiResponse<OrderList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AdminOrderQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = admin_service::list_all_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with items", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = admin_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated on the order and its splits", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = admin_service::update_order_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/coupons",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "List coupons", body = ApiResponse<CouponList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_coupons(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<CouponList>>> {
    let resp = admin_service::list_coupons(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/coupons",
    request_body = CouponRequest,
    responses(
        (status = 200, description = "Coupon created", body = ApiResponse<Coupon>),
        (status = 409, description = "Code already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_coupon(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CouponRequest>,
) -> AppResult<Json<ApiResponse<Coupon>>> {
    payload.validate()?;
    let resp = admin_service::create_coupon(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/coupons/{id}",
    params(("id" = Uuid, Path, description = "Coupon ID")),
    request_body = UpdateCouponRequest,
    responses(
        (status = 200, description = "Coupon updated", body = ApiResponse<Coupon>),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_coupon(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCouponRequest>,
) -> AppResult<Json<ApiResponse<Coupon>>> {
    payload.validate()?;
    let resp = admin_service::update_coupon(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/coupons/{id}",
    params(("id" = Uuid, Path, description = "Coupon ID")),
    responses(
        (status = 200, description = "Coupon deleted"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_coupon(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = admin_service::delete_coupon(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/vendors/applications",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "Vendors waiting for admission", body = ApiResponse<VendorList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn vendor_applications(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<VendorList>>> {
    let resp = admin_service::vendor_applications(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/vendors/{id}/admit",
    params(("id" = Uuid, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Vendor admitted", body = ApiResponse<Profile>),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn admit_vendor(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let resp = admin_service::admit_vendor(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/payouts",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by payout status"),
    ),
    responses(
        (status = 200, description = "Payout requests", body = ApiResponse<PayoutList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_payouts(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PayoutQuery>,
) -> AppResult<Json<ApiResponse<PayoutList>>> {
    let resp = admin_service::list_payouts(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/payouts/{id}",
    params(("id" = Uuid, Path, description = "Payout ID")),
    request_body = UpdatePayoutRequest,
    responses(
        (status = 200, description = "Payout updated", body = ApiResponse<VendorPayment>),
        (status = 409, description = "Payout already refunded"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_payout(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePayoutRequest>,
) -> AppResult<Json<ApiResponse<VendorPayment>>> {
    payload.validate()?;
    let resp = admin_service::update_payout(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/inventory/low-stock",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("threshold" = Option<i32>, Query, description = "Stock threshold, default 5"),
    ),
    responses(
        (status = 200, description = "Low stock products", body = ApiResponse<ProductList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn low_stock_products(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = admin_service::low_stock_products(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/inventory/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = InventoryAdjustRequest,
    responses(
        (status = 200, description = "Stock adjusted", body = ApiResponse<Product>),
        (status = 400, description = "Delta out of range or stock would go negative"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn adjust_inventory(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<InventoryAdjustRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    payload.validate()?;
    let resp = admin_service::adjust_inventory(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = admin_service::delete_product(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/reports/sales",
    responses(
        (status = 200, description = "Sales report", body = ApiResponse<SalesReport>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn sales_report(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<SalesReport>>> {
    let resp = report_service::sales_report(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/settings",
    request_body = SiteSettingsRequest,
    responses(
        (status = 200, description = "Site settings saved", body = ApiResponse<SiteSettings>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_settings(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SiteSettingsRequest>,
) -> AppResult<Json<ApiResponse<SiteSettings>>> {
    payload.validate()?;
    let resp = site_service::update_settings(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment ID")),
    request_body = CommentModerationRequest,
    responses(
        (status = 200, description = "Comment visibility changed", body = ApiResponse<Comment>),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn moderate_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CommentModerationRequest>,
) -> AppResult<Json<ApiResponse<Comment>>> {
    let resp = blog_service::set_comment_active(&state, &user, id, payload.active).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/posts/{id}/report",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Daily impressions", body = ApiResponse<Vec<PostReportDay>>),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn post_report(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<PostReportDay>>>> {
    let resp = blog_service::post_report(&state, &user, id).await?;
    Ok(Json(resp))
}
