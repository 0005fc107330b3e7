//! Money arithmetic shared by the cart, checkout and vendor panel.
//!
//! Amounts are integer minor units, weights are grams.

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub sub_total: i64,
    pub weight_grams: i64,
}

/// A priced line as stored on an order detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub price: i64,
    pub quantity: i32,
    pub weight_grams: i64,
}

/// Saturates instead of overflowing; request bounds keep real totals far below `i64::MAX`.
pub fn line_total(price: i64, quantity: i32) -> i64 {
    price.saturating_mul(i64::from(quantity))
}

pub fn sum_lines<I>(lines: I) -> Totals
where
    I: IntoIterator<Item = Line>,
{
    lines.into_iter().fold(Totals::default(), |acc, line| Totals {
        sub_total: acc
            .sub_total
            .saturating_add(line_total(line.price, line.quantity)),
        weight_grams: acc
            .weight_grams
            .saturating_add(line.weight_grams.saturating_mul(i64::from(line.quantity))),
    })
}

/// Percentage discount, rounded half up.
pub fn discount_for(sub_total: i64, percent: i32) -> i64 {
    let percent = i64::from(percent.clamp(0, 100));
    let scaled = i128::from(sub_total) * i128::from(percent) + 50;
    (scaled / 100) as i64
}

pub fn order_amount(sub_total: i64, discount: i64, shipping: i64) -> i64 {
    sub_total.saturating_sub(discount).max(0).saturating_add(shipping)
}

/// The price a customer pays for one unit.
pub fn effective_price(price: i64, discount_price: i64, on_sale: bool) -> i64 {
    if on_sale && discount_price > 0 && discount_price < price {
        discount_price
    } else {
        price
    }
}

/// Quantity accepted for a new cart line.
pub fn requested_quantity(requested: i32, available: i32) -> AppResult<i32> {
    if available <= 0 {
        return Err(AppError::BadRequest("Product is out of stock".into()));
    }
    Ok(requested.max(1).min(available))
}

/// Quantity of an existing cart line after adding `requested` more units.
pub fn merged_quantity(current: i32, requested: i32, available: i32) -> AppResult<i32> {
    let requested = requested_quantity(requested, available)?;
    if current >= available {
        return Err(AppError::BadRequest(format!(
            "Can't add more, only {available} available"
        )));
    }
    Ok(current.saturating_add(requested).min(available))
}

pub fn referral_commission(amount: i64, rate_bps: i64) -> i64 {
    (i128::from(amount) * i128::from(rate_bps) / 10_000) as i64
}

/// Average rating on a 0..=100 scale from 1..=5 star rates.
pub fn rating_average(sum: i64, count: i64) -> i32 {
    if count <= 0 {
        return 0;
    }
    let scaled = i128::from(sum) * 20;
    ((scaled + i128::from(count) / 2) / i128::from(count)) as i32
}
