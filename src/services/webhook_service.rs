use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbBackend, EntityTrait, PaginatorTrait, QueryFilter, Statement,
};
use uuid::Uuid;

use crate::{
    dto::checkout::WebhookAck,
    entity::{Orders, WebhookEvents, webhook_events::Column as EventCol},
    error::{AppError, AppResult},
    mail,
    models::PaymentMethod,
    payments::{not_configured, signature::verify_stripe_signature, stripe::StripeEvent},
    services::order_service::{Finalized, Settlement, billing_for, finalize_order},
    state::AppState,
};

pub const STRIPE_COMPLETED: &str = "checkout.session.completed";
pub const STRIPE_ASYNC_SUCCEEDED: &str = "checkout.session.async_payment_succeeded";
pub const STRIPE_ASYNC_FAILED: &str = "checkout.session.async_payment_failed";

pub(crate) async fn already_processed<C: ConnectionTrait>(
    db: &C,
    provider: &str,
    event_id: &str,
) -> AppResult<bool> {
    Ok(WebhookEvents::find()
        .filter(EventCol::Provider.eq(provider))
        .filter(EventCol::EventId.eq(event_id))
        .count(db)
        .await?
        > 0)
}

/// Inserts the event id; `false` when it was already recorded.
///
/// Run inside the settling transaction, the insert blocks a concurrent claim of
/// the same id until commit, so only one caller ever sees `true`.
pub(crate) async fn claim_event<C: ConnectionTrait>(
    db: &C,
    provider: &str,
    event_id: &str,
) -> AppResult<bool> {
    let result = db
        .execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            INSERT INTO webhook_events (id, provider, event_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (provider, event_id) DO NOTHING
            "#,
            [Uuid::new_v4().into(), provider.into(), event_id.into()],
        ))
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Records an event that did not settle an order.
pub(crate) async fn remember<C: ConnectionTrait>(
    db: &C,
    provider: &str,
    event_id: &str,
) -> AppResult<()> {
    claim_event(db, provider, event_id).await?;
    Ok(())
}

async fn notify_payment_failed(state: &AppState, order_id: Uuid) -> AppResult<()> {
    let Some(order) = Orders::find_by_id(order_id).one(&state.orm).await? else {
        return Err(AppError::NotFound);
    };
    let email = match billing_for(&state.orm, order.id).await? {
        Some(billing) => Some(billing.email),
        None => order.email_client,
    };
    if let Some(email) = email {
        mail::send_best_effort(state.mailer.as_ref(), mail::payment_failed(&email, order.id)).await;
    }
    Ok(())
}

pub async fn stripe_webhook(
    state: &AppState,
    signature: Option<&str>,
    payload: &str,
) -> AppResult<WebhookAck> {
    let client = state
        .gateways
        .stripe
        .as_ref()
        .ok_or_else(|| not_configured(PaymentMethod::Stripe))?;
    let signature =
        signature.ok_or_else(|| AppError::BadRequest("Missing Stripe-Signature header".into()))?;
    verify_stripe_signature(signature, payload, client.webhook_secret(), Utc::now().timestamp())?;

    let event: StripeEvent = serde_json::from_str(payload)
        .map_err(|e| AppError::BadRequest(format!("Invalid event payload: {e}")))?;

    if already_processed(&state.orm, "stripe", &event.id).await? {
        tracing::info!(event_id = %event.id, "duplicate stripe event");
        return Ok(WebhookAck::new("duplicate"));
    }

    let object = &event.data.object;
    let status = match event.event_type.as_str() {
        STRIPE_COMPLETED | STRIPE_ASYNC_SUCCEEDED => {
            let order_id = object
                .order_id()
                .ok_or_else(|| AppError::BadRequest("Event has no order_id metadata".into()))?;
            if event.event_type == STRIPE_COMPLETED && !object.is_paid() {
                // Delayed methods complete the session first and pay later.
                tracing::info!(order_id = %order_id, payment_status = ?object.payment_status, "stripe session awaiting payment");
                remember(&state.orm, "stripe", &event.id).await?;
                return Ok(WebhookAck::new("pending"));
            }
            let charged = object
                .amount_total
                .ok_or_else(|| AppError::BadRequest("Event has no amount_total".into()))?;
            let reference = object
                .payment_intent
                .clone()
                .unwrap_or_else(|| object.id.clone());
            let settlement =
                Settlement::gateway(PaymentMethod::Stripe, reference, charged).with_event(&event.id);
            match finalize_order(state, order_id, settlement).await? {
                Finalized::Settled(_) => "processed",
                Finalized::DuplicateEvent => "duplicate",
            }
        }
        STRIPE_ASYNC_FAILED => {
            if let Some(order_id) = object.order_id() {
                notify_payment_failed(state, order_id).await?;
            }
            remember(&state.orm, "stripe", &event.id).await?;
            "payment_failed"
        }
        other => {
            tracing::debug!(event_type = other, "ignoring stripe event");
            remember(&state.orm, "stripe", &event.id).await?;
            "ignored"
        }
    };

    Ok(WebhookAck::new(status))
}
