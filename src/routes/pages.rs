use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::pages::{CreatePageRequest, PageList, UpdatePageRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Page,
    response::ApiResponse,
    routes::params::Pagination,
    services::page_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pages))
        .route("/{slug}", get(get_page))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(admin_list_pages).post(create_page))
        .route("/{id}", patch(update_page).delete(delete_page))
}

#[utoipa::path(
    get,
    path = "/api/pages",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "Active pages", body = ApiResponse<PageList>)
    ),
    tag = "Pages"
)]
pub async fn list_pages(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<PageList>>> {
    let resp = page_service::list_pages(&state, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/pages/{slug}",
    params(("slug" = String, Path, description = "Page slug")),
    responses(
        (status = 200, description = "Page", body = ApiResponse<Page>),
        (status = 404, description = "Not found or inactive"),
    ),
    tag = "Pages"
)]
pub async fn get_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<Page>>> {
    let resp = page_service::get_page(&state, &slug).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/pages",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "All pages", body = ApiResponse<PageList>),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Pages"
)]
pub async fn admin_list_pages(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<PageList>>> {
    let resp = page_service::admin_list_pages(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/pages",
    request_body = CreatePageRequest,
    responses(
        (status = 200, description = "Page created", body = ApiResponse<Page>),
        (status = 409, description = "Slug taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "Pages"
)]
pub async fn create_page(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePageRequest>,
) -> AppResult<Json<ApiResponse<Page>>> {
    payload.validate()?;
    let resp = page_service::create_page(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/pages/{id}",
    params(("id" = Uuid, Path, description = "Page ID")),
    request_body = UpdatePageRequest,
    responses(
        (status = 200, description = "Page updated", body = ApiResponse<Page>),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Pages"
)]
pub async fn update_page(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePageRequest>,
) -> AppResult<Json<ApiResponse<Page>>> {
    payload.validate()?;
    let resp = page_service::update_page(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/pages/{id}",
    params(("id" = Uuid, Path, description = "Page ID")),
    responses(
        (status = 200, description = "Page deleted"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Pages"
)]
pub async fn delete_page(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = page_service::delete_page(&state, &user, id).await?;
    Ok(Json(resp))
}
