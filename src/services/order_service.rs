use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{OrderList, OrderWithItems},
    entity::{
        OrderDetails, OrderSuppliers, Orders, Payments, Products, Profiles, SiteSettings,
        order_details::Column as DetailCol,
        order_suppliers::Column as SplitCol,
        orders::{self, Column as OrderCol},
        payments::{self, Column as PaymentCol},
        products::Column as ProdCol,
        profiles::Column as ProfileCol,
    },
    error::{AppError, AppResult},
    mail,
    middleware::auth::AuthUser,
    models::{OrderStatus, PaymentMethod, billing_from_entity, order_from_entity},
    pricing,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{
        cart_service::{order_lines, order_splits},
        webhook_service::claim_event,
    },
    shipping::ShipmentRequest,
    state::AppState,
};

pub(crate) async fn billing_for<C: ConnectionTrait>(
    db: &C,
    order_id: Uuid,
) -> AppResult<Option<payments::Model>> {
    Ok(Payments::find()
        .filter(PaymentCol::OrderId.eq(order_id))
        .one(db)
        .await?)
}

pub(crate) async fn order_with_items<C: ConnectionTrait>(
    db: &C,
    order: orders::Model,
) -> AppResult<OrderWithItems> {
    let lines = order_lines(db, order.id).await?;
    let suppliers = order_splits(db, order.id).await?;
    let billing = billing_for(db, order.id).await?.map(billing_from_entity);
    Ok(OrderWithItems {
        order: order_from_entity(order),
        lines,
        suppliers,
        billing,
    })
}

/// How an order is being paid for.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub method: PaymentMethod,
    pub reference: Option<String>,
    /// Amount the gateway reports as charged, in minor units.
    pub charged: Option<i64>,
    /// Gateway event id claimed alongside the settlement.
    pub event: Option<String>,
}

impl Settlement {
    /// Wallet or cash on delivery; nothing to reconcile.
    pub fn direct(method: PaymentMethod) -> Self {
        Self {
            method,
            reference: None,
            charged: None,
            event: None,
        }
    }

    pub fn gateway(method: PaymentMethod, reference: impl Into<String>, charged: i64) -> Self {
        Self {
            method,
            reference: Some(reference.into()),
            charged: Some(charged),
            event: None,
        }
    }

    pub fn with_event(mut self, event_id: impl Into<String>) -> Self {
        self.event = Some(event_id.into());
        self
    }
}

#[derive(Debug)]
pub enum Finalized {
    Settled(orders::Model),
    /// The gateway event was already claimed by an earlier delivery.
    DuplicateEvent,
}

/// Settles an order: stock, splits, vendor and referral credit, wallet debit.
///
/// Calling it again for a finished order is a no-op that returns the stored order.
/// The settlement's event id is recorded in the same transaction.
pub async fn finalize_order(
    state: &AppState,
    order_id: Uuid,
    settlement: Settlement,
) -> AppResult<Finalized> {
    let Settlement {
        method,
        reference,
        charged,
        event,
    } = settlement;
    let txn = state.orm.begin().await?;

    let order = Orders::find_by_id(order_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(event_id) = &event {
        if !claim_event(&txn, method.as_str(), event_id).await? {
            tracing::info!(order_id = %order.id, event_id = %event_id, "duplicate payment event");
            return Ok(Finalized::DuplicateEvent);
        }
    }

    if order.is_finished {
        tracing::info!(order_id = %order.id, "order already finalized");
        txn.commit().await?;
        return Ok(Finalized::Settled(order));
    }

    let billing = billing_for(&txn, order.id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Billing details are required".into()))?;

    let details = OrderDetails::find()
        .filter(DetailCol::OrderId.eq(order.id))
        .all(&txn)
        .await?;
    if details.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    if let Some(charged) = charged {
        if charged != order.amount {
            tracing::warn!(order_id = %order.id, charged, expected = order.amount, "gateway amount mismatch");
            return Err(AppError::BadRequest(
                "Charged amount does not match the order total".into(),
            ));
        }
    }

    let customer = match order.user_id {
        Some(user_id) => Profiles::find()
            .filter(ProfileCol::UserId.eq(user_id))
            .lock(LockType::Update)
            .one(&txn)
            .await?,
        None => None,
    };

    if method == PaymentMethod::Balance {
        let customer = customer
            .as_ref()
            .ok_or_else(|| AppError::BadRequest("Wallet payment requires an account".into()))?;
        if customer.balance < order.amount {
            return Err(AppError::BadRequest("Insufficient balance".into()));
        }
        Profiles::update_many()
            .col_expr(ProfileCol::Balance, Expr::col(ProfileCol::Balance).sub(order.amount))
            .filter(ProfileCol::Id.eq(customer.id))
            .exec(&txn)
            .await?;
    }

    let mut sold: HashMap<Uuid, i32> = HashMap::new();
    for detail in &details {
        *sold.entry(detail.product_id).or_default() += detail.quantity;
    }
    for (product_id, quantity) in sold {
        Products::update_many()
            .col_expr(
                ProdCol::Available,
                Func::greatest([
                    Expr::col(ProdCol::Available).sub(quantity),
                    Expr::value(0),
                ])
                .into(),
            )
            .filter(ProdCol::Id.eq(product_id))
            .exec(&txn)
            .await?;
    }

    let now = Utc::now();
    let mut active: orders::ActiveModel = order.into();
    active.is_finished = Set(true);
    active.status = Set(OrderStatus::Underway.as_str().to_string());
    active.payment_method = Set(Some(method.as_str().to_string()));
    active.payment_reference = Set(reference);
    active.paid_at = Set(Some(now.into()));
    active.updated_at = Set(now.into());
    let order = active.update(&txn).await?;

    let splits = OrderSuppliers::find()
        .filter(SplitCol::OrderId.eq(order.id))
        .all(&txn)
        .await?;
    OrderSuppliers::update_many()
        .col_expr(SplitCol::Status, Expr::value(OrderStatus::Underway.as_str()))
        .col_expr(SplitCol::IsFinished, Expr::value(true))
        .col_expr(SplitCol::UpdatedAt, Expr::value(now))
        .filter(SplitCol::OrderId.eq(order.id))
        .exec(&txn)
        .await?;
    for split in &splits {
        Profiles::update_many()
            .col_expr(ProfileCol::Balance, Expr::col(ProfileCol::Balance).add(split.amount))
            .filter(ProfileCol::Id.eq(split.vendor_id))
            .exec(&txn)
            .await?;
    }

    if let Some(referrer) = customer.as_ref().and_then(|c| c.recommended_by) {
        let commission = pricing::referral_commission(order.amount, state.config.referral_rate_bps);
        if commission > 0 {
            Profiles::update_many()
                .col_expr(ProfileCol::Balance, Expr::col(ProfileCol::Balance).add(commission))
                .filter(ProfileCol::UserId.eq(referrer))
                .exec(&txn)
                .await?;
        }
    }

    let mut billing: payments::ActiveModel = billing.into();
    billing.payment_method = Set(Some(method.as_str().to_string()));
    let billing = billing.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(order_id = %order.id, method = %method, amount = order.amount, "order finalized");
    after_finalize(state, order, billing).await.map(Finalized::Settled)
}

/// Shipment, confirmation email and audit entry. Failures are logged only.
async fn after_finalize(
    state: &AppState,
    order: orders::Model,
    billing: payments::Model,
) -> AppResult<orders::Model> {
    let mut order = order;

    if let Some(provider) = &state.shipping {
        let shipper_name = SiteSettings::find()
            .one(&state.orm)
            .await
            .ok()
            .flatten()
            .map(|s| s.site_name)
            .unwrap_or_else(|| "Marketplace".to_string());
        let request = ShipmentRequest {
            reference: order.id.to_string(),
            weight_grams: order.weight_grams,
            shipper_name,
            consignee: billing_from_entity(billing.clone()),
        };
        match provider.create_shipment(&request).await {
            Ok(shipment) => {
                let mut active: orders::ActiveModel = order.clone().into();
                active.tracking_no = Set(Some(shipment.tracking_no));
                active.label_url = Set(shipment.label_url);
                match active.update(&state.orm).await {
                    Ok(updated) => order = updated,
                    Err(err) => tracing::warn!(error = %err, order_id = %order.id, "storing shipment failed"),
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, order_id = %order.id, provider = provider.name(), "shipment creation failed")
            }
        }
    }

    mail::send_best_effort(
        state.mailer.as_ref(),
        mail::order_placed(&billing.email, order.id, order.amount),
    )
    .await;

    audit::record(
        &state.pool,
        order.user_id,
        "order_finalized",
        "orders",
        serde_json::json!({
            "order_id": order.id,
            "amount": order.amount,
            "payment_method": order.payment_method,
        }),
    )
    .await;

    Ok(order)
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all()
        .add(OrderCol::UserId.eq(user.user_id))
        .add(OrderCol::IsFinished.eq(true));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        let status: OrderStatus = status.parse()?;
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let data = order_with_items(&state.orm, order).await?;
    Ok(ApiResponse::success("OK", data, Some(Meta::empty())))
}
