use chrono::{Datelike, Utc};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::admin::{SalesReport, StatusCount},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::MonthlyPoint,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Expands sparse `(month, count)` rows to all twelve months.
pub fn fill_months(rows: &[(i32, i64)]) -> Vec<MonthlyPoint> {
    (1..=12u32)
        .map(|month| MonthlyPoint {
            month,
            count: rows
                .iter()
                .filter(|(m, _)| *m as u32 == month)
                .map(|(_, c)| *c)
                .sum(),
        })
        .collect()
}

/// Products created per month of `year`, optionally for one vendor.
pub(crate) async fn products_by_month(
    pool: &DbPool,
    year: i32,
    vendor_id: Option<Uuid>,
) -> AppResult<Vec<MonthlyPoint>> {
    let rows: Vec<(i32, i64)> = sqlx::query_as(
        r#"
        SELECT EXTRACT(MONTH FROM created_at)::INT AS month, COUNT(*)::BIGINT AS count
        FROM products
        WHERE EXTRACT(YEAR FROM created_at)::INT = $1
          AND ($2::UUID IS NULL OR vendor_id = $2)
        GROUP BY 1
        "#,
    )
    .bind(year)
    .bind(vendor_id)
    .fetch_all(pool)
    .await?;
    Ok(fill_months(&rows))
}

/// Non-pending vendor splits per month of `year`, optionally for one vendor.
pub(crate) async fn splits_by_month(
    pool: &DbPool,
    year: i32,
    vendor_id: Option<Uuid>,
) -> AppResult<Vec<MonthlyPoint>> {
    let rows: Vec<(i32, i64)> = sqlx::query_as(
        r#"
        SELECT EXTRACT(MONTH FROM created_at)::INT AS month, COUNT(*)::BIGINT AS count
        FROM order_suppliers
        WHERE EXTRACT(YEAR FROM created_at)::INT = $1
          AND status <> 'pending'
          AND ($2::UUID IS NULL OR vendor_id = $2)
        GROUP BY 1
        "#,
    )
    .bind(year)
    .bind(vendor_id)
    .fetch_all(pool)
    .await?;
    Ok(fill_months(&rows))
}

pub fn current_year() -> i32 {
    Utc::now().year()
}

pub async fn sales_report(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<SalesReport>> {
    ensure_admin(user)?;

    let (finished_orders, revenue): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*)::BIGINT, COALESCE(SUM(amount), 0)::BIGINT FROM orders WHERE is_finished = TRUE",
    )
    .fetch_one(&state.pool)
    .await?;

    let by_status: Vec<(String, i64)> = sqlx::query_as(
        "SELECT status, COUNT(*)::BIGINT FROM orders WHERE is_finished = TRUE GROUP BY status ORDER BY status",
    )
    .fetch_all(&state.pool)
    .await?;

    let (vendors,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*)::BIGINT FROM profiles WHERE status = 'vendor' AND admission = TRUE",
    )
    .fetch_one(&state.pool)
    .await?;

    let (products,): (i64,) =
        sqlx::query_as("SELECT COUNT(*)::BIGINT FROM products WHERE is_deleted = FALSE")
            .fetch_one(&state.pool)
            .await?;

    let year = current_year();
    let report = SalesReport {
        finished_orders,
        revenue,
        by_status: by_status
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect(),
        vendors,
        products,
        year,
        monthly_orders: splits_by_month(&state.pool, year, None).await?,
        monthly_products: products_by_month(&state.pool, year, None).await?,
    };

    Ok(ApiResponse::success("Sales report", report, Some(Meta::empty())))
}
