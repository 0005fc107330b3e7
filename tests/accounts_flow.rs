mod common;

use chrono::{Duration, Utc};
use marketplace_api::{
    dto::{
        auth::{OtpRequest, OtpVerifyRequest},
        blog::{CreatePostRequest, ViewContext},
        catalog::CreateCategoryRequest,
    },
    entity::{EmailOtps, PostViews, email_otps, post_views},
    error::AppError,
    models::CategoryLevel,
    services::{
        auth_service::{self, OTP_MAX_ATTEMPTS},
        blog_service, category_service,
    },
    state::AppState,
};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use tokio::task::JoinSet;
use uuid::Uuid;

const OTP_EMAIL: &str = "otp@example.com";

async fn issue_otp(state: &AppState) -> anyhow::Result<email_otps::Model> {
    auth_service::request_email_otp(
        state,
        OtpRequest {
            email: OTP_EMAIL.into(),
        },
    )
    .await?;
    EmailOtps::find()
        .filter(email_otps::Column::Email.eq(OTP_EMAIL))
        .filter(email_otps::Column::IsVerified.eq(false))
        .order_by_desc(email_otps::Column::CreatedAt)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("otp missing"))
}

fn guess(otp: &str) -> OtpVerifyRequest {
    OtpVerifyRequest {
        email: OTP_EMAIL.into(),
        otp: otp.into(),
    }
}

fn wrong_code(otp: &str) -> &'static str {
    if otp == "000000" { "111111" } else { "000000" }
}

async fn attempts(state: &AppState, id: Uuid) -> anyhow::Result<i32> {
    Ok(EmailOtps::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("otp missing"))?
        .attempts)
}

#[tokio::test]
async fn otp_locks_after_too_many_wrong_guesses() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let record = issue_otp(&state).await?;
    let wrong = wrong_code(&record.otp);

    for _ in 0..OTP_MAX_ATTEMPTS {
        let result = auth_service::verify_email_otp(&state, guess(wrong)).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
    assert_eq!(attempts(&state, record.id).await?, OTP_MAX_ATTEMPTS);

    // Even the right code is refused once the limit is reached.
    let locked = auth_service::verify_email_otp(&state, guess(&record.otp)).await;
    assert!(matches!(locked, Err(AppError::BadRequest(_))));
    assert_eq!(attempts(&state, record.id).await?, OTP_MAX_ATTEMPTS);

    // A fresh code replaces the locked one.
    let fresh = issue_otp(&state).await?;
    assert!(EmailOtps::find_by_id(record.id).one(&state.orm).await?.is_none());
    let login = auth_service::verify_email_otp(&state, guess(&fresh.otp))
        .await?
        .data
        .unwrap();
    assert!(login.token.starts_with("Bearer "));

    Ok(())
}

#[tokio::test]
async fn expired_otp_is_refused() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let record = issue_otp(&state).await?;
    EmailOtps::update_many()
        .col_expr(
            email_otps::Column::ExpiresAt,
            Expr::value(Utc::now() - Duration::minutes(1)),
        )
        .filter(email_otps::Column::Id.eq(record.id))
        .exec(&state.orm)
        .await?;

    let result = auth_service::verify_email_otp(&state, guess(&record.otp)).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
    let stored = EmailOtps::find_by_id(record.id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("otp missing"))?;
    assert!(!stored.is_verified);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_guesses_never_exceed_the_attempt_limit() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let record = issue_otp(&state).await?;
    let wrong = wrong_code(&record.otp);

    let mut guesses = JoinSet::new();
    for _ in 0..8 {
        let state = state.clone();
        guesses.spawn(async move { auth_service::verify_email_otp(&state, guess(wrong)).await });
    }
    let mut refused = 0;
    while let Some(result) = guesses.join_next().await {
        assert!(matches!(result?, Err(AppError::BadRequest(_))));
        refused += 1;
    }
    assert_eq!(refused, 8);
    assert_eq!(attempts(&state, record.id).await?, OTP_MAX_ATTEMPTS);

    Ok(())
}

#[tokio::test]
async fn category_levels_stop_at_mini() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let admin = common::admin_user(&state).await?;

    let mut parent_id = None;
    let mut chain = Vec::new();
    for name in ["Fashion", "Men", "Shirts", "Oxford"] {
        let category = category_service::create_category(
            &state,
            &admin,
            CreateCategoryRequest {
                name: name.into(),
                parent_id,
                description: None,
                image_url: None,
            },
        )
        .await?
        .data
        .unwrap();
        parent_id = Some(category.id);
        chain.push(category);
    }
    let levels: Vec<&str> = chain.iter().map(|c| c.level.as_str()).collect();
    assert_eq!(
        levels,
        [
            CategoryLevel::Super.as_str(),
            CategoryLevel::Main.as_str(),
            CategoryLevel::Sub.as_str(),
            CategoryLevel::Mini.as_str(),
        ]
    );

    let under_mini = category_service::create_category(
        &state,
        &admin,
        CreateCategoryRequest {
            name: "Too Deep".into(),
            parent_id: Some(chain[3].id),
            description: None,
            image_url: None,
        },
    )
    .await;
    assert!(matches!(under_mini, Err(AppError::BadRequest(_))));

    let with_children = category_service::delete_category(&state, &admin, chain[1].id).await;
    assert!(matches!(with_children, Err(AppError::Conflict(_))));

    category_service::delete_category(&state, &admin, chain[3].id).await?;
    category_service::delete_category(&state, &admin, chain[2].id).await?;
    category_service::delete_category(&state, &admin, chain[1].id).await?;

    Ok(())
}

#[tokio::test]
async fn post_views_count_towards_daily_impressions() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let admin = common::admin_user(&state).await?;
    let post = blog_service::create_post(
        &state,
        &admin,
        CreatePostRequest {
            title: "Spring Drop".into(),
            content: "New arrivals".into(),
            category_id: None,
            image_url: None,
            tags: Some("news".into()),
        },
    )
    .await?
    .data
    .unwrap();

    for _ in 0..2 {
        blog_service::get_post(&state, &post.slug, ViewContext::default()).await?;
    }
    let viewed = blog_service::get_post(&state, &post.slug, ViewContext::default())
        .await?
        .data
        .unwrap();
    assert_eq!(viewed.views, 3);

    let views = PostViews::find()
        .filter(post_views::Column::PostId.eq(post.id))
        .count(&state.orm)
        .await?;
    assert_eq!(views, 3);

    let report = blog_service::post_report(&state, &admin, post.id)
        .await?
        .data
        .unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].created_on, Utc::now().date_naive());
    assert_eq!(report[0].impressions, 3);

    let missing = blog_service::get_post(&state, "no-such-post", ViewContext::default()).await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    Ok(())
}
