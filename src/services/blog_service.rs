use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbBackend, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, Statement, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::blog::{CommentList, CommentRequest, CreatePostRequest, PostList, UpdatePostRequest, ViewContext},
    entity::{
        Comments, PostReports, Posts,
        comments::{self, Column as CommentCol},
        post_reports::Column as ReportCol,
        post_views,
        posts::{self, Column as PostCol},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Comment, Post, PostReportDay, Role, comment_from_entity, post_from_entity},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, PostQuery},
    services::{auth_service::load_profile, category_service, vendor_service::ensure_vendor},
    slugs,
    state::AppState,
};

pub(crate) async fn post_slug_taken<C: ConnectionTrait>(db: &C, slug: String) -> AppResult<bool> {
    Ok(Posts::find()
        .filter(PostCol::Slug.eq(slug))
        .count(db)
        .await?
        > 0)
}

async fn post_by_slug<C: ConnectionTrait>(db: &C, slug: &str) -> AppResult<posts::Model> {
    Posts::find()
        .filter(PostCol::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn list_posts(state: &AppState, query: PostQuery) -> AppResult<ApiResponse<PostList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(PostCol::Title).ilike(pattern.clone()))
                .add(Expr::col(PostCol::Content).ilike(pattern)),
        );
    }
    if let Some(tag) = query.tag.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(PostCol::Tags).ilike(format!("%{}%", tag)));
    }
    if let Some(slug) = query.category.as_ref().filter(|s| !s.is_empty()) {
        let ids = category_service::subtree_ids_by_slug(&state.orm, slug).await?;
        condition = condition.add(PostCol::CategoryId.is_in(ids));
    }

    let finder = Posts::find()
        .filter(condition)
        .order_by_desc(PostCol::PublishedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(post_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Posts",
        PostList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Returns the post and records the view, the counter and today's impressions.
pub async fn get_post(
    state: &AppState,
    slug: &str,
    view: ViewContext,
) -> AppResult<ApiResponse<Post>> {
    let txn = state.orm.begin().await?;
    let post = post_by_slug(&txn, slug).await?;

    post_views::ActiveModel {
        id: Set(Uuid::new_v4()),
        post_id: Set(post.id),
        ip: Set(view.ip),
        user_agent: Set(view.user_agent),
        referral: Set(view.referral),
        created_on: Set(Utc::now().date_naive()),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    Posts::update_many()
        .col_expr(PostCol::Views, Expr::col(PostCol::Views).add(1))
        .filter(PostCol::Id.eq(post.id))
        .exec(&txn)
        .await?;

    txn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        r#"
        INSERT INTO post_reports (id, post_id, publisher_id, impressions, created_on)
        VALUES ($1, $2, (SELECT user_id FROM profiles WHERE id = $3), 1, CURRENT_DATE)
        ON CONFLICT (post_id, created_on)
        DO UPDATE SET impressions = post_reports.impressions + 1
        "#,
        [Uuid::new_v4().into(), post.id.into(), post.author_id.into()],
    ))
    .await?;
    txn.commit().await?;

    let post = Posts::find_by_id(post.id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Post", post_from_entity(post), Some(Meta::empty())))
}

pub async fn list_comments(
    state: &AppState,
    slug: &str,
    pagination: Pagination,
) -> AppResult<ApiResponse<CommentList>> {
    let post = post_by_slug(&state.orm, slug).await?;
    let (page, limit, offset) = pagination.normalize();
    let finder = Comments::find()
        .filter(CommentCol::PostId.eq(post.id))
        .filter(CommentCol::Active.eq(true))
        .order_by_asc(CommentCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(comment_from_entity)
        .collect();
    Ok(ApiResponse::success(
        "Comments",
        CommentList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn add_comment(
    state: &AppState,
    user: Option<&AuthUser>,
    slug: &str,
    payload: CommentRequest,
) -> AppResult<ApiResponse<Comment>> {
    let post = post_by_slug(&state.orm, slug).await?;
    let profile_id = match user {
        Some(user) => Some(load_profile(&state.orm, user.user_id).await?.id),
        None => None,
    };

    let comment = comments::ActiveModel {
        id: Set(Uuid::new_v4()),
        post_id: Set(post.id),
        profile_id: Set(profile_id),
        name: Set(payload.name),
        email: Set(payload.email),
        body: Set(payload.body),
        active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Comment added",
        comment_from_entity(comment),
        Some(Meta::empty()),
    ))
}

/// Admins and admitted vendors may publish.
pub async fn create_post(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePostRequest,
) -> AppResult<ApiResponse<Post>> {
    let author = if user.role == Role::Admin.as_str() {
        load_profile(&state.orm, user.user_id).await.ok()
    } else {
        Some(ensure_vendor(&state.orm, user).await?)
    };

    let db = &state.orm;
    let slug = slugs::unique_slug(&payload.title, |candidate| post_slug_taken(db, candidate)).await?;

    let post = posts::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title),
        content: Set(payload.content),
        category_id: Set(payload.category_id),
        author_id: Set(author.map(|a| a.id)),
        image_url: Set(payload.image_url),
        views: Set(0),
        tags: Set(payload.tags),
        slug: Set(slug),
        published_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "post_create",
        "posts",
        serde_json::json!({ "post_id": post.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Post created",
        post_from_entity(post),
        Some(Meta::empty()),
    ))
}

pub async fn update_post(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdatePostRequest,
) -> AppResult<ApiResponse<Post>> {
    ensure_admin(user)?;
    let post = Posts::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: posts::ActiveModel = post.into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(content) = payload.content {
        active.content = Set(content);
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(Some(category_id));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    if let Some(tags) = payload.tags {
        active.tags = Set(Some(tags));
    }
    active.updated_at = Set(Utc::now().into());
    let post = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Post updated",
        post_from_entity(post),
        Some(Meta::empty()),
    ))
}

pub async fn delete_post(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;
    let res = Posts::delete_by_id(id).exec(&state.orm).await?;
    if res.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    audit::record(
        &state.pool,
        Some(user.user_id),
        "post_delete",
        "posts",
        serde_json::json!({ "post_id": id }),
    )
    .await;
    Ok(ApiResponse::message("Post deleted"))
}

pub async fn set_comment_active(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    active_flag: bool,
) -> AppResult<ApiResponse<Comment>> {
    ensure_admin(user)?;
    let comment = Comments::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let mut active: comments::ActiveModel = comment.into();
    active.active = Set(active_flag);
    let comment = active.update(&state.orm).await?;
    Ok(ApiResponse::success(
        "Comment updated",
        comment_from_entity(comment),
        Some(Meta::empty()),
    ))
}

/// Daily impressions of one post, newest first.
pub async fn post_report(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Vec<PostReportDay>>> {
    ensure_admin(user)?;
    let days = PostReports::find()
        .filter(ReportCol::PostId.eq(id))
        .order_by_desc(ReportCol::CreatedOn)
        .limit(90)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|r| PostReportDay {
            created_on: r.created_on,
            impressions: r.impressions,
        })
        .collect();
    Ok(ApiResponse::success("Post report", days, Some(Meta::empty())))
}
