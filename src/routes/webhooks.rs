use axum::{Json, Router, extract::State, http::HeaderMap, routing::post};

use crate::{
    dto::checkout::WebhookAck, error::AppResult, services::webhook_service, state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/stripe", post(stripe_webhook))
}

#[utoipa::path(
    post,
    path = "/api/webhooks/stripe",
    request_body(content = String, description = "Raw Stripe event", content_type = "application/json"),
    params(("Stripe-Signature" = String, Header, description = "Stripe signature header")),
    responses(
        (status = 200, description = "Event handled or ignored", body = WebhookAck),
        (status = 400, description = "Bad signature or payload"),
    ),
    tag = "Webhooks"
)]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> AppResult<Json<WebhookAck>> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok());
    let ack = webhook_service::stripe_webhook(&state, signature, &body).await?;
    Ok(Json(ack))
}
