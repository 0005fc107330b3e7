use std::collections::HashMap;

use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::catalog::{CategoryTree, CreateCategoryRequest, UpdateCategoryRequest},
    dto::products::ProductList,
    entity::{
        Categories, Products,
        categories::{self, Column as CategoryCol},
        products::Column as ProdCol,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, CategoryLevel, CategoryNode, category_from_entity, product_from_entity},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    slugs,
    state::AppState,
};

/// Ids of `root` and every category below it.
pub fn collect_descendants(all: &[categories::Model], root: Uuid) -> Vec<Uuid> {
    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for category in all {
        if let Some(parent) = category.parent_id {
            children.entry(parent).or_default().push(category.id);
        }
    }

    let mut ids = vec![root];
    let mut cursor = 0;
    while cursor < ids.len() {
        if let Some(kids) = children.get(&ids[cursor]) {
            ids.extend(kids.iter().copied());
        }
        cursor += 1;
    }
    ids
}

/// Nests a flat category list under its roots, keeping input order per level.
pub fn build_tree(all: Vec<categories::Model>) -> Vec<CategoryNode> {
    let mut by_parent: HashMap<Option<Uuid>, Vec<Category>> = HashMap::new();
    for model in all {
        by_parent
            .entry(model.parent_id)
            .or_default()
            .push(category_from_entity(model));
    }

    fn attach(parent: Option<Uuid>, by_parent: &mut HashMap<Option<Uuid>, Vec<Category>>) -> Vec<CategoryNode> {
        let Some(level) = by_parent.remove(&parent) else {
            return Vec::new();
        };
        level
            .into_iter()
            .map(|category| {
                let children = attach(Some(category.id), by_parent);
                CategoryNode { category, children }
            })
            .collect()
    }

    attach(None, &mut by_parent)
}

/// Category ids matching `slug` and its subtree; empty when the slug is unknown.
pub(crate) async fn subtree_ids_by_slug<C: ConnectionTrait>(db: &C, slug: &str) -> AppResult<Vec<Uuid>> {
    let all = Categories::find().all(db).await?;
    let Some(root) = all.iter().find(|c| c.slug == slug).map(|c| c.id) else {
        return Ok(Vec::new());
    };
    Ok(collect_descendants(&all, root))
}

pub(crate) async fn category_slug_taken<C: ConnectionTrait>(db: &C, slug: String) -> AppResult<bool> {
    Ok(Categories::find()
        .filter(CategoryCol::Slug.eq(slug))
        .count(db)
        .await?
        > 0)
}

pub async fn tree(state: &AppState) -> AppResult<ApiResponse<CategoryTree>> {
    let all = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?;
    Ok(ApiResponse::success(
        "Categories",
        CategoryTree {
            items: build_tree(all),
        },
        Some(Meta::empty()),
    ))
}

pub async fn products_in(
    state: &AppState,
    slug: &str,
    pagination: Pagination,
) -> AppResult<ApiResponse<ProductList>> {
    let ids = subtree_ids_by_slug(&state.orm, slug).await?;
    if ids.is_empty() {
        return Err(AppError::NotFound);
    }
    let (page, limit, offset) = pagination.normalize();

    let finder = Products::find()
        .filter(ProdCol::CategoryId.is_in(ids))
        .filter(ProdCol::IsActive.eq(true))
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

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;

    let level = match payload.parent_id {
        Some(parent_id) => {
            let parent = Categories::find_by_id(parent_id)
                .one(&state.orm)
                .await?
                .ok_or_else(|| AppError::BadRequest("Parent category not found".into()))?;
            let parent_level: CategoryLevel = parent.level.parse()?;
            parent_level.child().ok_or_else(|| {
                AppError::BadRequest("Mini categories cannot have children".into())
            })?
        }
        None => CategoryLevel::Super,
    };

    let db = &state.orm;
    let slug = slugs::unique_slug(&payload.name, |candidate| category_slug_taken(db, candidate)).await?;

    let category = categories::ActiveModel {
        id: Set(Uuid::new_v4()),
        parent_id: Set(payload.parent_id),
        level: Set(level.as_str().to_string()),
        name: Set(payload.name),
        slug: Set(slug),
        description: Set(payload.description),
        image_url: Set(payload.image_url),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    let category = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: categories::ActiveModel = category.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    let category = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Category updated",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;
    let children = Categories::find()
        .filter(CategoryCol::ParentId.eq(id))
        .count(&state.orm)
        .await?;
    if children > 0 {
        return Err(AppError::Conflict(
            "Category has children and cannot be deleted".into(),
        ));
    }

    let res = Categories::delete_by_id(id).exec(&state.orm).await?;
    if res.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "category_delete",
        "categories",
        serde_json::json!({ "category_id": id }),
    )
    .await;

    Ok(ApiResponse::message("Category deleted"))
}
