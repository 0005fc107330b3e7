use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::checkout::{
        BillingRequest, CheckoutSummary, MyFatoorahCallbackQuery, PaymobCallbackQuery,
        PaypalVerifyRequest, RazorpayOrderResponse, RazorpayVerifyRequest, RedirectSession,
        WebhookAck,
    },
    dto::orders::OrderWithItems,
    entity::{
        OrderDetails, Orders, Payments, SiteSettings,
        order_details::Column as DetailCol,
        orders::{self, Column as OrderCol},
        payments::{self, Column as PaymentCol},
    },
    error::{AppError, AppResult},
    mail,
    middleware::auth::AuthUser,
    models::{PaymentMethod, billing_from_entity, order_from_entity},
    payments::{
        from_major_units, myfatoorah::InvoiceRequest, not_configured, stripe::SessionRequest,
    },
    response::{ApiResponse, Meta},
    services::{
        auth_service::load_profile,
        cart_service::{locked_cart, recompute_order},
        order_service::{Finalized, Settlement, billing_for, finalize_order, order_with_items},
        webhook_service::{already_processed, remember},
    },
    shipping::RateRequest,
    slugs,
    state::AppState,
};

/// Flat site fee, or a carrier quote when a shipping provider is configured.
async fn quote_shipping<C: ConnectionTrait>(
    state: &AppState,
    db: &C,
    weight_grams: i64,
    billing: &BillingRequest,
) -> AppResult<i64> {
    match &state.shipping {
        Some(provider) => {
            let request = RateRequest {
                weight_grams,
                destination_country_code: billing.country_code.to_uppercase(),
                destination_city: billing.city.clone(),
                destination_post_code: billing.post_code.clone(),
            };
            provider.quote(&request).await
        }
        None => Ok(SiteSettings::find()
            .one(db)
            .await?
            .map(|s| s.shipping_fee)
            .unwrap_or(0)),
    }
}

/// The caller's cart, which must have lines and billing details.
async fn payable_cart(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<(orders::Model, payments::Model)> {
    let order = Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .filter(OrderCol::IsFinished.eq(false))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("Cart is empty".into()))?;
    let billing = billing_for(&state.orm, order.id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Billing details are required".into()))?;
    Ok((order, billing))
}

fn checkout_url(state: &AppState, path: &str) -> String {
    format!("{}{}", state.config.public_base_url.trim_end_matches('/'), path)
}

async fn store_gateway_ref(
    state: &AppState,
    order: orders::Model,
    gateway_ref: String,
    amount: i64,
    merchant_order_id: Option<String>,
) -> AppResult<orders::Model> {
    let mut active: orders::ActiveModel = order.into();
    active.gateway_order_ref = Set(Some(gateway_ref));
    active.gateway_amount = Set(Some(amount));
    if merchant_order_id.is_some() {
        active.merchant_order_id = Set(merchant_order_id);
    }
    Ok(active.update(&state.orm).await?)
}

pub async fn submit_billing(
    state: &AppState,
    user: &AuthUser,
    payload: BillingRequest,
) -> AppResult<ApiResponse<CheckoutSummary>> {
    let txn = state.orm.begin().await?;
    let order = locked_cart(&txn, user.user_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Cart is empty".into()))?;
    let lines = OrderDetails::find()
        .filter(DetailCol::OrderId.eq(order.id))
        .count(&txn)
        .await?;
    if lines == 0 {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    Payments::delete_many()
        .filter(PaymentCol::OrderId.eq(order.id))
        .exec(&txn)
        .await?;
    let billing = payments::ActiveModel {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        first_name: Set(payload.first_name.clone()),
        last_name: Set(payload.last_name.clone()),
        country: Set(payload.country.clone()),
        country_code: Set(payload.country_code.to_uppercase()),
        state: Set(payload.state.clone()),
        city: Set(payload.city.clone()),
        street_address: Set(payload.street_address.clone()),
        post_code: Set(payload.post_code.clone()),
        email: Set(payload.email.clone()),
        phone: Set(payload.phone.clone()),
        payment_method: Set(None),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let shipping = quote_shipping(state, &txn, order.weight_grams, &payload).await?;
    let mut active: orders::ActiveModel = order.into();
    active.shipping = Set(shipping);
    let order = active.update(&txn).await?;
    let order = recompute_order(&txn, order).await?;

    let wallet_balance = load_profile(&txn, user.user_id).await?.balance;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Billing saved",
        CheckoutSummary {
            order: order_from_entity(order),
            billing: billing_from_entity(billing),
            payment_methods: state.gateways.enabled_methods(),
            wallet_balance,
        },
        Some(Meta::empty()),
    ))
}

fn settled(outcome: Finalized) -> AppResult<orders::Model> {
    match outcome {
        Finalized::Settled(order) => Ok(order),
        Finalized::DuplicateEvent => Err(AppError::Conflict("Payment was already processed".into())),
    }
}

async fn settle_cart(
    state: &AppState,
    user: &AuthUser,
    method: PaymentMethod,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let (order, _) = payable_cart(state, user).await?;
    let order = settled(finalize_order(state, order.id, Settlement::direct(method)).await?)?;
    let data = order_with_items(&state.orm, order).await?;
    Ok(ApiResponse::success("Order placed", data, Some(Meta::empty())))
}

pub async fn pay_with_balance(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderWithItems>> {
    settle_cart(state, user, PaymentMethod::Balance).await
}

pub async fn pay_cash(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderWithItems>> {
    settle_cart(state, user, PaymentMethod::Cash).await
}

pub async fn stripe_session(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<RedirectSession>> {
    let client = state
        .gateways
        .stripe
        .as_ref()
        .ok_or_else(|| not_configured(PaymentMethod::Stripe))?;
    let (order, billing) = payable_cart(state, user).await?;

    let session = client
        .create_checkout_session(SessionRequest {
            order_id: order.id,
            amount: order.amount,
            currency: &state.config.currency,
            customer_email: &billing.email,
            success_url: checkout_url(state, &format!("/checkout/success?order={}", order.id)),
            cancel_url: checkout_url(state, "/checkout/cancel"),
        })
        .await?;
    let url = session
        .url
        .clone()
        .ok_or_else(|| AppError::Gateway("stripe session has no url".into()))?;
    let amount = order.amount;
    store_gateway_ref(state, order, session.id.clone(), amount, None).await?;

    Ok(ApiResponse::success(
        "Stripe session created",
        RedirectSession {
            provider: PaymentMethod::Stripe,
            url,
            reference: session.id,
        },
        Some(Meta::empty()),
    ))
}

pub async fn razorpay_order(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<RazorpayOrderResponse>> {
    let client = state
        .gateways
        .razorpay
        .as_ref()
        .ok_or_else(|| not_configured(PaymentMethod::Razorpay))?;
    let (order, _) = payable_cart(state, user).await?;

    let created = client
        .create_order(order.amount, &state.config.currency, &order.id.to_string())
        .await?;
    store_gateway_ref(state, order, created.id.clone(), created.amount, None).await?;

    Ok(ApiResponse::success(
        "Razorpay order created",
        RazorpayOrderResponse {
            key_id: client.key_id().to_string(),
            razorpay_order_id: created.id,
            amount: created.amount,
            currency: created.currency,
        },
        Some(Meta::empty()),
    ))
}

pub async fn razorpay_verify(
    state: &AppState,
    user: &AuthUser,
    payload: RazorpayVerifyRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let client = state
        .gateways
        .razorpay
        .as_ref()
        .ok_or_else(|| not_configured(PaymentMethod::Razorpay))?;
    let (order, _) = payable_cart(state, user).await?;

    if order.gateway_order_ref.as_deref() != Some(payload.razorpay_order_id.as_str()) {
        return Err(AppError::BadRequest("Razorpay order does not match the cart".into()));
    }
    if !client.verify_payment(
        &payload.razorpay_order_id,
        &payload.razorpay_payment_id,
        &payload.razorpay_signature,
    ) {
        return Err(AppError::BadRequest("Invalid payment signature".into()));
    }

    // The checkout was signed for the amount Razorpay was asked to collect.
    let charged = order
        .gateway_amount
        .ok_or_else(|| AppError::BadRequest("Razorpay order does not match the cart".into()))?;
    let settlement = Settlement::gateway(
        PaymentMethod::Razorpay,
        payload.razorpay_payment_id.clone(),
        charged,
    )
    .with_event(&payload.razorpay_payment_id);
    let order = settled(finalize_order(state, order.id, settlement).await?)?;

    let data = order_with_items(&state.orm, order).await?;
    Ok(ApiResponse::success("Order placed", data, Some(Meta::empty())))
}

pub async fn paypal_verify(
    state: &AppState,
    user: &AuthUser,
    payload: PaypalVerifyRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let client = state
        .gateways
        .paypal
        .as_ref()
        .ok_or_else(|| not_configured(PaymentMethod::Paypal))?;
    let (order, _) = payable_cart(state, user).await?;

    if already_processed(&state.orm, "paypal", &payload.paypal_order_id).await? {
        return Err(AppError::Conflict("PayPal order was already used".into()));
    }

    let paypal_order = client.get_order(&payload.paypal_order_id).await?;
    if !paypal_order.is_completed() {
        return Err(AppError::BadRequest(format!(
            "PayPal order is {}",
            paypal_order.status
        )));
    }
    let charged = paypal_order
        .total_value()
        .and_then(from_major_units)
        .ok_or_else(|| AppError::BadRequest("PayPal amount does not match the order".into()))?;
    if charged != order.amount {
        tracing::warn!(order_id = %order.id, charged, expected = order.amount, "paypal amount mismatch");
        return Err(AppError::BadRequest("PayPal amount does not match the order".into()));
    }

    let settlement = Settlement::gateway(PaymentMethod::Paypal, paypal_order.id.clone(), charged)
        .with_event(&paypal_order.id);
    let order = settled(finalize_order(state, order.id, settlement).await?)?;

    let data = order_with_items(&state.orm, order).await?;
    Ok(ApiResponse::success("Order placed", data, Some(Meta::empty())))
}

pub async fn paymob_session(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<RedirectSession>> {
    let client = state
        .gateways
        .paymob
        .as_ref()
        .ok_or_else(|| not_configured(PaymentMethod::Paymob))?;
    let (order, billing) = payable_cart(state, user).await?;

    let merchant_order_id = slugs::with_short_code(&order.id.to_string(), &slugs::short_code(6));
    let billing = billing_from_entity(billing);
    let session = client
        .create_session(&merchant_order_id, order.amount, &billing)
        .await?;
    let amount = order.amount;
    store_gateway_ref(
        state,
        order,
        session.paymob_order_id.clone(),
        amount,
        Some(merchant_order_id),
    )
    .await?;

    Ok(ApiResponse::success(
        "PayMob session created",
        RedirectSession {
            provider: PaymentMethod::Paymob,
            url: session.iframe_url,
            reference: session.paymob_order_id,
        },
        Some(Meta::empty()),
    ))
}

pub async fn paymob_callback(
    state: &AppState,
    query: PaymobCallbackQuery,
) -> AppResult<WebhookAck> {
    let client = state
        .gateways
        .paymob
        .as_ref()
        .ok_or_else(|| not_configured(PaymentMethod::Paymob))?;
    let event_id = query.id.to_string();
    if already_processed(&state.orm, "paymob", &event_id).await? {
        return Ok(WebhookAck::new("duplicate"));
    }

    let order = Orders::find()
        .filter(OrderCol::MerchantOrderId.eq(query.merchant_order_id.as_str()))
        .filter(OrderCol::GatewayOrderRef.eq(query.order.as_str()))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let transaction = client.transaction(query.id).await?;
    if transaction.id == query.id && transaction.success {
        let settlement =
            Settlement::gateway(PaymentMethod::Paymob, event_id.clone(), transaction.amount_cents)
                .with_event(&event_id);
        let status = match finalize_order(state, order.id, settlement).await? {
            Finalized::Settled(_) => "paid",
            Finalized::DuplicateEvent => "duplicate",
        };
        return Ok(WebhookAck::new(status));
    }

    if let Some(email) = order.email_client.as_deref() {
        mail::send_best_effort(state.mailer.as_ref(), mail::payment_failed(email, order.id)).await;
    }
    remember(&state.orm, "paymob", &event_id).await?;
    Ok(WebhookAck::new("failed"))
}

pub async fn myfatoorah_session(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<RedirectSession>> {
    let client = state
        .gateways
        .myfatoorah
        .as_ref()
        .ok_or_else(|| not_configured(PaymentMethod::Myfatoorah))?;
    let (order, billing) = payable_cart(state, user).await?;
    let billing = billing_from_entity(billing);

    let invoice = client
        .send_payment(InvoiceRequest {
            amount: order.amount,
            currency: &state.config.currency,
            billing: &billing,
            callback_url: checkout_url(state, "/api/checkout/myfatoorah/callback"),
            error_url: checkout_url(state, "/checkout/cancel"),
        })
        .await?;
    let invoice_id = invoice.invoice_id.to_string();
    let amount = order.amount;
    store_gateway_ref(state, order, invoice_id.clone(), amount, None).await?;

    Ok(ApiResponse::success(
        "MyFatoorah invoice created",
        RedirectSession {
            provider: PaymentMethod::Myfatoorah,
            url: invoice.invoice_url,
            reference: invoice_id,
        },
        Some(Meta::empty()),
    ))
}

pub async fn myfatoorah_callback(
    state: &AppState,
    query: MyFatoorahCallbackQuery,
) -> AppResult<WebhookAck> {
    let client = state
        .gateways
        .myfatoorah
        .as_ref()
        .ok_or_else(|| not_configured(PaymentMethod::Myfatoorah))?;
    if already_processed(&state.orm, "myfatoorah", &query.payment_id).await? {
        return Ok(WebhookAck::new("duplicate"));
    }

    let payment = client.payment_status(&query.payment_id).await?;
    let order = Orders::find()
        .filter(OrderCol::GatewayOrderRef.eq(payment.invoice_id.to_string()))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if payment.is_paid() {
        let charged = payment
            .charged_minor_units()
            .ok_or_else(|| AppError::BadRequest("Invoice has no value".into()))?;
        let settlement =
            Settlement::gateway(PaymentMethod::Myfatoorah, query.payment_id.clone(), charged)
                .with_event(&query.payment_id);
        let status = match finalize_order(state, order.id, settlement).await? {
            Finalized::Settled(_) => "paid",
            Finalized::DuplicateEvent => "duplicate",
        };
        return Ok(WebhookAck::new(status));
    }

    tracing::info!(order_id = %order.id, status = %payment.invoice_status, "myfatoorah payment not paid");
    remember(&state.orm, "myfatoorah", &query.payment_id).await?;
    Ok(WebhookAck::new("failed"))
}
