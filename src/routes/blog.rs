use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, header},
    routing::{get, patch},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::blog::{
        CommentList, CommentRequest, CreatePostRequest, PostList, UpdatePostRequest, ViewContext,
    },
    error::AppResult,
    middleware::auth::{AuthUser, OptionalAuthUser},
    models::{Comment, Post},
    response::ApiResponse,
    routes::params::{Pagination, PostQuery},
    services::blog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{slug}", get(get_post))
        .route("/posts/{slug}/comments", get(list_comments).post(add_comment))
        .route("/manage/posts/{id}", patch(update_post).delete(delete_post))
}

fn header_str(headers: &HeaderMap, name: impl header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Client address prefers the first `X-Forwarded-For` hop, then `X-Real-IP`.
pub fn view_context(headers: &HeaderMap) -> ViewContext {
    let ip = header_str(headers, "x-forwarded-for")
        .and_then(|list| list.split(',').next().map(|ip| ip.trim().to_string()))
        .filter(|ip| !ip.is_empty())
        .or_else(|| header_str(headers, "x-real-ip"));
    ViewContext {
        ip,
        user_agent: header_str(headers, header::USER_AGENT),
        referral: header_str(headers, header::REFERER),
    }
}

#[utoipa::path(
    get,
    path = "/api/blog/posts",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Search in title and content"),
        ("category" = Option<String>, Query, description = "Category slug"),
        ("tag" = Option<String>, Query, description = "Tag"),
    ),
    responses(
        (status = 200, description = "Published posts", body = ApiResponse<PostList>)
    ),
    tag = "Blog"
)]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostQuery>,
) -> AppResult<Json<ApiResponse<PostList>>> {
    let resp = blog_service::list_posts(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/blog/posts/{slug}",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Post, view recorded", body = ApiResponse<Post>),
        (status = 404, description = "Not found"),
    ),
    tag = "Blog"
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> AppResult<Json<ApiResponse<Post>>> {
    let resp = blog_service::get_post(&state, &slug, view_context(&headers)).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/blog/posts/{slug}/comments",
    params(
        ("slug" = String, Path, description = "Post slug"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "Visible comments", body = ApiResponse<CommentList>),
        (status = 404, description = "Not found"),
    ),
    tag = "Blog"
)]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<CommentList>>> {
    let resp = blog_service::list_comments(&state, &slug, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/blog/posts/{slug}/comments",
    params(("slug" = String, Path, description = "Post slug")),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comment added", body = ApiResponse<Comment>),
        (status = 404, description = "Not found"),
    ),
    tag = "Blog"
)]
pub async fn add_comment(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    Path(slug): Path<String>,
    Json(payload): Json<CommentRequest>,
) -> AppResult<Json<ApiResponse<Comment>>> {
    payload.validate()?;
    let resp = blog_service::add_comment(&state, user.as_ref(), &slug, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/blog/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 200, description = "Post created", body = ApiResponse<Post>),
        (status = 403, description = "Only admins and admitted vendors may post"),
    ),
    security(("bearer_auth" = [])),
    tag = "Blog"
)]
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePostRequest>,
) -> AppResult<Json<ApiResponse<Post>>> {
    payload.validate()?;
    let resp = blog_service::create_post(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/blog/manage/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = ApiResponse<Post>),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Blog"
)]
pub async fn update_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePostRequest>,
) -> AppResult<Json<ApiResponse<Post>>> {
    payload.validate()?;
    let resp = blog_service::update_post(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/blog/manage/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Blog"
)]
pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = blog_service::delete_post(&state, &user, id).await?;
    Ok(Json(resp))
}
