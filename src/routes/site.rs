use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::site::{ContactRequest, NewsletterRequest, SiteInfo},
    error::AppResult,
    response::ApiResponse,
    services::site_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(site_info))
        .route("/newsletter", post(subscribe).delete(unsubscribe))
        .route("/contact", post(contact))
}

#[utoipa::path(
    get,
    path = "/api/site",
    responses(
        (status = 200, description = "Site settings and contact info", body = ApiResponse<SiteInfo>)
    ),
    tag = "Site"
)]
pub async fn site_info(State(state): State<AppState>) -> AppResult<Json<ApiResponse<SiteInfo>>> {
    let resp = site_service::settings(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/site/newsletter",
    request_body = NewsletterRequest,
    responses(
        (status = 200, description = "Subscribed"),
        (status = 400, description = "Invalid email"),
    ),
    tag = "Site"
)]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(payload): Json<NewsletterRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    payload.validate()?;
    let resp = site_service::subscribe(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/site/newsletter",
    request_body = NewsletterRequest,
    responses(
        (status = 200, description = "Unsubscribed"),
    ),
    tag = "Site"
)]
pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(payload): Json<NewsletterRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    payload.validate()?;
    let resp = site_service::unsubscribe(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/site/contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Message stored"),
    ),
    tag = "Site"
)]
pub async fn contact(
    State(state): State<AppState>,
    Json(payload): Json<ContactRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    payload.validate()?;
    let resp = site_service::contact(&state, payload).await?;
    Ok(Json(resp))
}
