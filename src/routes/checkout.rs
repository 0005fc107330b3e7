use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::checkout::{
        BillingRequest, CheckoutSummary, MyFatoorahCallbackQuery, PaymobCallbackQuery,
        PaypalVerifyRequest, RazorpayOrderResponse, RazorpayVerifyRequest, RedirectSession,
        WebhookAck,
    },
    dto::orders::OrderWithItems,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::checkout_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/billing", post(submit_billing))
        .route("/balance", post(pay_with_balance))
        .route("/cash", post(pay_cash))
        .route("/stripe", post(stripe_session))
        .route("/razorpay", post(razorpay_order))
        .route("/razorpay/verify", post(razorpay_verify))
        .route("/paypal/verify", post(paypal_verify))
        .route("/paymob", post(paymob_session))
        .route("/paymob/callback", get(paymob_callback))
        .route("/myfatoorah", post(myfatoorah_session))
        .route("/myfatoorah/callback", get(myfatoorah_callback))
}

#[utoipa::path(
    post,
    path = "/api/checkout/billing",
    request_body = BillingRequest,
    responses(
        (status = 200, description = "Billing saved, payment options returned", body = ApiResponse<CheckoutSummary>),
        (status = 400, description = "Cart is empty"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn submit_billing(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<BillingRequest>,
) -> AppResult<Json<ApiResponse<CheckoutSummary>>> {
    payload.validate()?;
    let resp = checkout_service::submit_billing(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/checkout/balance",
    responses(
        (status = 200, description = "Paid from wallet balance", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Insufficient balance or no billing"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn pay_with_balance(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = checkout_service::pay_with_balance(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/checkout/cash",
    responses(
        (status = 200, description = "Placed as cash on delivery", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "No billing"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn pay_cash(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = checkout_service::pay_cash(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/checkout/stripe",
    responses(
        (status = 200, description = "Stripe checkout session", body = ApiResponse<RedirectSession>),
        (status = 400, description = "Gateway not configured"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn stripe_session(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<RedirectSession>>> {
    let resp = checkout_service::stripe_session(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/checkout/razorpay",
    responses(
        (status = 200, description = "Razorpay order for the client widget", body = ApiResponse<RazorpayOrderResponse>),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn razorpay_order(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<RazorpayOrderResponse>>> {
    let resp = checkout_service::razorpay_order(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/checkout/razorpay/verify",
    request_body = RazorpayVerifyRequest,
    responses(
        (status = 200, description = "Payment verified and order placed", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Signature mismatch"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn razorpay_verify(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RazorpayVerifyRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    payload.validate()?;
    let resp = checkout_service::razorpay_verify(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/checkout/paypal/verify",
    request_body = PaypalVerifyRequest,
    responses(
        (status = 200, description = "Capture verified and order placed", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Capture incomplete or amount mismatch"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn paypal_verify(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PaypalVerifyRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    payload.validate()?;
    let resp = checkout_service::paypal_verify(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/checkout/paymob",
    responses(
        (status = 200, description = "PayMob iframe session", body = ApiResponse<RedirectSession>),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn paymob_session(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<RedirectSession>>> {
    let resp = checkout_service::paymob_session(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/checkout/paymob/callback",
    params(
        ("order" = String, Query, description = "PayMob order id"),
        ("merchant_order_id" = String, Query, description = "Local order id"),
        ("id" = i64, Query, description = "PayMob transaction id"),
    ),
    responses(
        (status = 200, description = "Callback handled", body = WebhookAck),
    ),
    tag = "Checkout"
)]
pub async fn paymob_callback(
    State(state): State<AppState>,
    Query(query): Query<PaymobCallbackQuery>,
) -> AppResult<Json<WebhookAck>> {
    let ack = checkout_service::paymob_callback(&state, query).await?;
    Ok(Json(ack))
}

#[utoipa::path(
    post,
    path = "/api/checkout/myfatoorah",
    responses(
        (status = 200, description = "MyFatoorah payment link", body = ApiResponse<RedirectSession>),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn myfatoorah_session(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<RedirectSession>>> {
    let resp = checkout_service::myfatoorah_session(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/checkout/myfatoorah/callback",
    params(("paymentId" = String, Query, description = "MyFatoorah payment id")),
    responses(
        (status = 200, description = "Callback handled", body = WebhookAck),
    ),
    tag = "Checkout"
)]
pub async fn myfatoorah_callback(
    State(state): State<AppState>,
    Query(query): Query<MyFatoorahCallbackQuery>,
) -> AppResult<Json<WebhookAck>> {
    let ack = checkout_service::myfatoorah_callback(&state, query).await?;
    Ok(Json(ack))
}
