use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::pages::{CreatePageRequest, PageList, UpdatePageRequest},
    entity::{
        Pages,
        pages::{self, Column as PageCol},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Page, page_from_entity},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    slugs,
    state::AppState,
};

pub(crate) async fn page_slug_taken<C: ConnectionTrait>(db: &C, slug: String) -> AppResult<bool> {
    Ok(Pages::find()
        .filter(PageCol::Slug.eq(slug))
        .count(db)
        .await?
        > 0)
}

async fn paged(
    state: &AppState,
    pagination: Pagination,
    active_only: bool,
) -> AppResult<ApiResponse<PageList>> {
    let (page, limit, offset) = pagination.normalize();
    let mut finder = Pages::find().order_by_asc(PageCol::Name);
    if active_only {
        finder = finder.filter(PageCol::Active.eq(true));
    }
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(page_from_entity)
        .collect();
    Ok(ApiResponse::success(
        "Pages",
        PageList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn list_pages(state: &AppState, pagination: Pagination) -> AppResult<ApiResponse<PageList>> {
    paged(state, pagination, true).await
}

/// Inactive pages are hidden from the public.
pub async fn get_page(state: &AppState, slug: &str) -> AppResult<ApiResponse<Page>> {
    let page = Pages::find()
        .filter(PageCol::Slug.eq(slug))
        .filter(PageCol::Active.eq(true))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Page", page_from_entity(page), Some(Meta::empty())))
}

pub async fn admin_list_pages(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<PageList>> {
    ensure_admin(user)?;
    paged(state, pagination, false).await
}

/// An explicit slug must be free; otherwise one is derived from the name.
pub async fn create_page(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePageRequest,
) -> AppResult<ApiResponse<Page>> {
    ensure_admin(user)?;
    let db = &state.orm;
    let slug = match payload.slug.as_deref().map(slugs::slugify).filter(|s| !s.is_empty()) {
        Some(slug) => {
            if page_slug_taken(db, slug.clone()).await? {
                return Err(AppError::Conflict(format!("Page slug {slug} is taken")));
            }
            slug
        }
        None => slugs::unique_slug(&payload.name, |candidate| page_slug_taken(db, candidate)).await?,
    };

    let page = pages::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        content: Set(payload.content),
        slug: Set(slug),
        active: Set(payload.active.unwrap_or(true)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "page_create",
        "pages",
        serde_json::json!({ "page_id": page.id, "slug": page.slug }),
    )
    .await;

    Ok(ApiResponse::success(
        "Page created",
        page_from_entity(page),
        Some(Meta::empty()),
    ))
}

pub async fn update_page(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdatePageRequest,
) -> AppResult<ApiResponse<Page>> {
    ensure_admin(user)?;
    let page = Pages::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: pages::ActiveModel = page.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(content) = payload.content {
        active.content = Set(content);
    }
    if let Some(flag) = payload.active {
        active.active = Set(flag);
    }
    active.updated_at = Set(Utc::now().into());
    let page = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "page_update",
        "pages",
        serde_json::json!({ "page_id": page.id, "active": page.active }),
    )
    .await;

    Ok(ApiResponse::success(
        "Page updated",
        page_from_entity(page),
        Some(Meta::empty()),
    ))
}

pub async fn delete_page(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;
    let res = Pages::delete_by_id(id).exec(&state.orm).await?;
    if res.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    audit::record(
        &state.pool,
        Some(user.user_id),
        "page_delete",
        "pages",
        serde_json::json!({ "page_id": id }),
    )
    .await;
    Ok(ApiResponse::message("Page deleted"))
}
