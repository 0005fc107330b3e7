#![allow(dead_code)]

use marketplace_api::{
    config::{AppConfig, AramexConfig},
    db::{create_pool, orm_from_pool, run_migrations},
    dto::{
        auth::RegisterRequest, cart::AddToCartRequest, cart::CartView, checkout::BillingRequest,
        products::CreateProductRequest,
    },
    entity::{Products, Profiles, profiles},
    middleware::auth::AuthUser,
    models::{Account, Product},
    services::{admin_service, auth_service, cart_service, vendor_service},
    state::AppState,
};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Statement};
use uuid::Uuid;

pub fn test_config(database_url: &str) -> AppConfig {
    AppConfig {
        jwt_ttl_hours: 1,
        ..AppConfig::local(database_url, "test-secret")
    }
}

pub fn aramex_config() -> AramexConfig {
    AramexConfig {
        username: "user".into(),
        password: "pass".into(),
        account_number: "20016".into(),
        account_pin: "331421".into(),
        account_entity: "AMM".into(),
        account_country_code: "JO".into(),
        version: "v1.0".into(),
        source: "24".into(),
        base_url: "https://ws.sbx.aramex.net".into(),
    }
}

/// Connects to the test database, or `None` when none is configured.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    setup_state_with(|_| {}).await
}

/// Like [`setup_state`], with gateway or fee settings adjusted first.
pub async fn setup_state_with(
    configure: impl FnOnce(&mut AppConfig),
) -> anyhow::Result<Option<AppState>> {
    let Ok(database_url) =
        std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL"))
    else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests.");
        return Ok(None);
    };

    let pool = create_pool(&database_url).await?;
    let orm = orm_from_pool(&pool);
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE audit_logs, webhook_events, vendor_payments, payments, order_details_suppliers, \
         order_suppliers, order_details, orders, coupons, product_ratings, product_sizes, products, \
         post_reports, post_views, comments, posts, categories, email_otps, social_links, \
         bank_accounts, profiles, users, site_settings, contact_infos, newsletter_subscribers, \
         contact_messages, pages RESTART IDENTITY CASCADE",
    ))
    .await?;

    let mut config = test_config(&database_url);
    configure(&mut config);
    Ok(Some(AppState::new(pool, orm, config)?))
}

pub async fn register(
    state: &AppState,
    email: &str,
    referral_code: Option<String>,
) -> anyhow::Result<Account> {
    let resp = auth_service::register_user(
        state,
        RegisterRequest {
            email: email.into(),
            password: "password123".into(),
            display_name: Some(email.split('@').next().unwrap_or(email).into()),
            referral_code,
        },
    )
    .await?;
    Ok(resp.data.unwrap())
}

pub fn customer(account: &Account) -> AuthUser {
    AuthUser {
        user_id: account.user.id,
        role: "customer".into(),
    }
}

pub async fn admin_user(state: &AppState) -> anyhow::Result<AuthUser> {
    Ok(AuthUser {
        user_id: register(state, "admin@example.com", None).await?.user.id,
        role: "admin".into(),
    })
}

/// Registers, applies and admits a vendor.
pub async fn admitted_vendor(
    state: &AppState,
    admin: &AuthUser,
    email: &str,
) -> anyhow::Result<AuthUser> {
    let account = register(state, email, None).await?;
    let vendor = AuthUser {
        user_id: account.user.id,
        role: "vendor".into(),
    };
    let applied = auth_service::apply_vendor(state, &vendor).await?.data.unwrap();
    admin_service::admit_vendor(state, admin, applied.profile.id).await?;
    Ok(vendor)
}

pub async fn listed_product(
    state: &AppState,
    vendor: &AuthUser,
    name: &str,
    price: i64,
    available: i32,
) -> anyhow::Result<Product> {
    let resp = vendor_service::create_product(
        state,
        vendor,
        CreateProductRequest {
            name: name.into(),
            description: format!("{name} description"),
            content: None,
            price,
            discount_price: None,
            weight_grams: Some(100),
            available,
            sku: None,
            on_sale: None,
            promotional: None,
            tags: None,
            category_id: None,
            image_url: None,
            sizes: Vec::new(),
        },
    )
    .await?;
    Ok(resp.data.unwrap())
}

pub async fn add_line(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    quantity: i32,
) -> anyhow::Result<CartView> {
    let resp = cart_service::add_to_cart(
        state,
        user,
        AddToCartRequest {
            product_id,
            quantity,
            size: None,
        },
    )
    .await?;
    Ok(resp.data.unwrap())
}

pub fn billing(email: &str) -> BillingRequest {
    BillingRequest {
        first_name: "Sam".into(),
        last_name: "Rivera".into(),
        country: "Jordan".into(),
        country_code: "jo".into(),
        state: None,
        city: "Amman".into(),
        street_address: "1 Main St".into(),
        post_code: None,
        email: email.into(),
        phone: "+962700000000".into(),
    }
}

async fn profile(state: &AppState, user_id: Uuid) -> anyhow::Result<profiles::Model> {
    Profiles::find()
        .filter(profiles::Column::UserId.eq(user_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("profile missing"))
}

pub async fn balance(state: &AppState, user_id: Uuid) -> anyhow::Result<i64> {
    Ok(profile(state, user_id).await?.balance)
}

pub async fn requested(state: &AppState, user_id: Uuid) -> anyhow::Result<i64> {
    Ok(profile(state, user_id).await?.requested)
}

pub async fn available(state: &AppState, product_id: Uuid) -> anyhow::Result<i32> {
    let product = Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("product missing"))?;
    Ok(product.available)
}
