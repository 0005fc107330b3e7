use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::admin::SiteSettingsRequest,
    dto::site::{ContactRequest, NewsletterRequest, SiteInfo},
    entity::{
        ContactInfos, NewsletterSubscribers, SiteSettings, contact_infos, contact_messages,
        newsletter_subscribers::{self, Column as SubscriberCol},
        site_settings,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{SiteSettings as Settings, contact_info_from_entity, site_settings_from_entity},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn settings(state: &AppState) -> AppResult<ApiResponse<SiteInfo>> {
    let settings = SiteSettings::find()
        .one(&state.orm)
        .await?
        .map(site_settings_from_entity);
    let contacts = ContactInfos::find()
        .filter(contact_infos::Column::Active.eq(true))
        .order_by_asc(contact_infos::Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(contact_info_from_entity)
        .collect();
    Ok(ApiResponse::success(
        "Site",
        SiteInfo { settings, contacts },
        Some(Meta::empty()),
    ))
}

/// The settings table holds a single row; it is created on first save.
pub async fn update_settings(
    state: &AppState,
    user: &AuthUser,
    payload: SiteSettingsRequest,
) -> AppResult<ApiResponse<Settings>> {
    ensure_admin(user)?;
    let existing = SiteSettings::find().one(&state.orm).await?;

    let saved = match existing {
        Some(row) => {
            let mut active: site_settings::ActiveModel = row.into();
            active.site_name = Set(payload.site_name);
            active.site_title = Set(payload.site_title);
            active.description = Set(payload.description.unwrap_or_default());
            active.site_url = Set(payload.site_url);
            active.shipping_fee = Set(payload.shipping_fee);
            active.updated_at = Set(Utc::now().into());
            active.update(&state.orm).await?
        }
        None => {
            site_settings::ActiveModel {
                id: Set(Uuid::new_v4()),
                site_name: Set(payload.site_name),
                site_title: Set(payload.site_title),
                description: Set(payload.description.unwrap_or_default()),
                site_url: Set(payload.site_url),
                shipping_fee: Set(payload.shipping_fee),
                updated_at: NotSet,
            }
            .insert(&state.orm)
            .await?
        }
    };

    audit::record(
        &state.pool,
        Some(user.user_id),
        "site_settings_update",
        "site_settings",
        serde_json::json!({ "shipping_fee": saved.shipping_fee }),
    )
    .await;

    Ok(ApiResponse::success(
        "Settings saved",
        site_settings_from_entity(saved),
        Some(Meta::empty()),
    ))
}

pub async fn subscribe(state: &AppState, payload: NewsletterRequest) -> AppResult<ApiResponse<()>> {
    let email = payload.email.trim().to_lowercase();
    let row = newsletter_subscribers::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        subscribed: Set(true),
        created_at: NotSet,
    };
    NewsletterSubscribers::insert(row)
        .on_conflict(
            OnConflict::column(SubscriberCol::Email)
                .update_column(SubscriberCol::Subscribed)
                .to_owned(),
        )
        .exec(&state.orm)
        .await?;
    Ok(ApiResponse::message("Subscribed"))
}

pub async fn unsubscribe(state: &AppState, payload: NewsletterRequest) -> AppResult<ApiResponse<()>> {
    let email = payload.email.trim().to_lowercase();
    let res = NewsletterSubscribers::update_many()
        .col_expr(SubscriberCol::Subscribed, sea_orm::sea_query::Expr::value(false))
        .filter(SubscriberCol::Email.eq(email))
        .exec(&state.orm)
        .await?;
    if res.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(ApiResponse::message("Unsubscribed"))
}

pub async fn contact(state: &AppState, payload: ContactRequest) -> AppResult<ApiResponse<()>> {
    let message = contact_messages::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        email: Set(payload.email),
        phone: Set(payload.phone),
        subject: Set(payload.subject),
        message: Set(payload.message),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    tracing::info!(message_id = %message.id, "contact message stored");
    Ok(ApiResponse::message("Message received"))
}
