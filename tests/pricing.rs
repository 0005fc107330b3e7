use chrono::{Duration, Utc};
use marketplace_api::{
    entity::coupons,
    models::{CategoryLevel, OrderStatus, PaymentMethod, PayoutStatus},
    payments::{from_major_units, to_major_units},
    pricing::{
        Line, discount_for, effective_price, line_total, merged_quantity, order_amount, rating_average,
        referral_commission, requested_quantity, sum_lines,
    },
    routes::params::Pagination,
    services::{cart_service::coupon_applies, report_service::fill_months},
};
use uuid::Uuid;

#[test]
fn lines_sum_price_and_weight() {
    let totals = sum_lines([
        Line { price: 500, quantity: 2, weight_grams: 100 },
        Line { price: 250, quantity: 1, weight_grams: 50 },
    ]);
    assert_eq!(totals.sub_total, 1250);
    assert_eq!(totals.weight_grams, 250);
}

#[test]
fn discount_rounds_half_up() {
    assert_eq!(discount_for(999, 10), 100);
    assert_eq!(discount_for(1005, 10), 101);
    assert_eq!(discount_for(1000, 0), 0);
    assert_eq!(discount_for(1000, 150), 1000);
}

#[test]
fn order_amount_never_goes_below_shipping() {
    assert_eq!(order_amount(1000, 100, 500), 1400);
    assert_eq!(order_amount(1000, 1200, 500), 500);
}

#[test]
fn sale_price_applies_only_when_lower() {
    assert_eq!(effective_price(1000, 800, true), 800);
    assert_eq!(effective_price(1000, 800, false), 1000);
    assert_eq!(effective_price(1000, 1200, true), 1000);
    assert_eq!(effective_price(1000, 0, true), 1000);
}

#[test]
fn cart_quantities_are_capped_by_stock() {
    assert_eq!(requested_quantity(0, 5).unwrap(), 1);
    assert_eq!(requested_quantity(10, 5).unwrap(), 5);
    assert!(requested_quantity(1, 0).is_err());

    assert_eq!(merged_quantity(2, 2, 5).unwrap(), 4);
    assert_eq!(merged_quantity(4, 3, 5).unwrap(), 5);
    assert!(merged_quantity(5, 1, 5).is_err());
}

#[test]
fn huge_quantities_and_prices_do_not_overflow() {
    assert_eq!(merged_quantity(1, i32::MAX, i32::MAX).unwrap(), i32::MAX);
    assert_eq!(line_total(i64::MAX, 2), i64::MAX);

    let totals = sum_lines([
        Line { price: i64::MAX, quantity: 3, weight_grams: i64::MAX },
        Line { price: 1, quantity: 1, weight_grams: 1 },
    ]);
    assert_eq!(totals.sub_total, i64::MAX);
    assert_eq!(totals.weight_grams, i64::MAX);

    assert_eq!(discount_for(i64::MAX, 100), i64::MAX);
    assert_eq!(order_amount(i64::MAX, 0, 500), i64::MAX);
    assert!(referral_commission(i64::MAX, 250) > 0);
    assert_eq!(to_major_units(i64::MIN), "-92233720368547758.08");
}

#[test]
fn referral_commission_truncates() {
    assert_eq!(referral_commission(10_000, 250), 250);
    assert_eq!(referral_commission(999, 250), 24);
}

#[test]
fn rating_average_is_scaled_to_hundred() {
    assert_eq!(rating_average(0, 0), 0);
    assert_eq!(rating_average(5, 1), 100);
    assert_eq!(rating_average(9, 2), 90);
    assert_eq!(rating_average(14, 3), 93);
}

#[test]
fn minor_units_render_as_decimal() {
    assert_eq!(to_major_units(1250), "12.50");
    assert_eq!(to_major_units(5), "0.05");
    assert_eq!(to_major_units(-150), "-1.50");
}

#[test]
fn decimal_amounts_parse_to_minor_units() {
    assert_eq!(from_major_units("12.50"), Some(1250));
    assert_eq!(from_major_units("12.5"), Some(1250));
    assert_eq!(from_major_units("12"), Some(1200));
    assert_eq!(from_major_units("0.05"), Some(5));
    assert_eq!(from_major_units("-1.50"), Some(-150));
    assert_eq!(from_major_units(&to_major_units(2300)), Some(2300));

    assert_eq!(from_major_units("12.505"), None);
    assert_eq!(from_major_units(".50"), None);
    assert_eq!(from_major_units("1e3"), None);
    assert_eq!(from_major_units("12.-5"), None);
    assert_eq!(from_major_units(""), None);
    assert_eq!(from_major_units("99999999999999999999.00"), None);
}

#[test]
fn pagination_is_clamped() {
    assert_eq!(Pagination::default().normalize(), (1, 20, 0));
    let p = Pagination { page: Some(0), per_page: Some(500) };
    assert_eq!(p.normalize(), (1, 100, 0));
    let p = Pagination { page: Some(3), per_page: Some(10) };
    assert_eq!(p.normalize(), (3, 10, 20));
}

#[test]
fn enums_parse_from_stored_text() {
    assert_eq!("underway".parse::<OrderStatus>().unwrap(), OrderStatus::Underway);
    assert_eq!("myfatoorah".parse::<PaymentMethod>().unwrap(), PaymentMethod::Myfatoorah);
    assert_eq!(PayoutStatus::Refunded.to_string(), "refunded");
    assert!("shipped".parse::<OrderStatus>().is_err());

    assert!(!OrderStatus::Pending.marks_finished());
    assert!(OrderStatus::Complete.marks_finished());
    assert_eq!(CategoryLevel::Sub.child(), Some(CategoryLevel::Mini));
    assert_eq!(CategoryLevel::Mini.child(), None);
}

#[test]
fn monthly_series_has_twelve_points() {
    let points = fill_months(&[(1, 3), (12, 2), (1, 1)]);
    assert_eq!(points.len(), 12);
    assert_eq!(points[0].count, 4);
    assert_eq!(points[5].count, 0);
    assert_eq!(points[11].month, 12);
    assert_eq!(points[11].count, 2);
}

fn coupon(active: bool, from_days: i64, to_days: i64) -> coupons::Model {
    let now = Utc::now();
    coupons::Model {
        id: Uuid::new_v4(),
        code: "SAVE".into(),
        valid_from: (now + Duration::days(from_days)).into(),
        valid_to: (now + Duration::days(to_days)).into(),
        discount: 10,
        active,
        created_at: now.into(),
    }
}

#[test]
fn coupon_window_and_flag_are_checked() {
    let now = Utc::now();
    assert!(coupon_applies(&coupon(true, -1, 1), now));
    assert!(!coupon_applies(&coupon(false, -1, 1), now));
    assert!(!coupon_applies(&coupon(true, 1, 2), now));
    assert!(!coupon_applies(&coupon(true, -2, -1), now));
}
