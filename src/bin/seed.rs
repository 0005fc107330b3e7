use chrono::{Duration, Utc};
use marketplace_api::{
    config::AppConfig,
    db::create_pool,
    services::auth_service::hash_password,
    slugs::{short_code, slugify, with_short_code},
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_account(&pool, "admin@example.com", "admin12345", "admin", "customer", false).await?;
    let vendor_id = ensure_account(&pool, "vendor@example.com", "vendor12345", "vendor", "vendor", true).await?;
    let customer_id = ensure_account(&pool, "user@example.com", "user12345", "customer", "customer", false).await?;

    let category_id = seed_categories(&pool).await?;
    seed_products(&pool, vendor_id, category_id).await?;
    seed_coupon(&pool).await?;
    seed_site(&pool).await?;

    println!(
        "Seed completed. Admin: {admin_id}, Vendor profile: {vendor_id}, Customer: {customer_id}"
    );
    Ok(())
}

/// Returns the user id for admins and customers, the profile id for vendors.
async fn ensure_account(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
    status: &str,
    admitted: bool,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    let name = email.split('@').next().unwrap_or(email);
    let (profile_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO profiles (id, user_id, display_name, status, admission, referral_code, slug)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (user_id) DO UPDATE SET status = EXCLUDED.status, admission = EXCLUDED.admission
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(name)
    .bind(status)
    .bind(admitted)
    .bind(short_code(8))
    .bind(with_short_code(&slugify(name), &short_code(6)))
    .fetch_one(pool)
    .await?;

    println!("Ensured {email} (role={role}, status={status})");
    Ok(if status == "vendor" { profile_id } else { user_id })
}

async fn ensure_category(
    pool: &sqlx::PgPool,
    name: &str,
    level: &str,
    parent_id: Option<Uuid>,
) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO categories (id, parent_id, level, name, slug)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(parent_id)
    .bind(level)
    .bind(name)
    .bind(slugify(name))
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Seeds one branch of the tree and returns its leaf.
async fn seed_categories(pool: &sqlx::PgPool) -> anyhow::Result<Uuid> {
    let fashion = ensure_category(pool, "Fashion", "super", None).await?;
    let men = ensure_category(pool, "Men", "main", Some(fashion)).await?;
    let clothing = ensure_category(pool, "Men Clothing", "sub", Some(men)).await?;
    let shirts = ensure_category(pool, "Shirts", "mini", Some(clothing)).await?;
    println!("Seeded categories");
    Ok(shirts)
}

async fn seed_products(
    pool: &sqlx::PgPool,
    vendor_id: Uuid,
    category_id: Uuid,
) -> anyhow::Result<()> {
    let products = vec![
        ("Rust Logo Tee", "Cotton tee with the crab", 2500, 0, 200, 50, &["S", "M", "L"][..]),
        ("Ferris Hoodie", "Warm hoodie for Rustaceans", 5500, 4900, 600, 20, &["M", "L", "XL"][..]),
        ("Async Polo", "Polo shirt that never blocks", 3200, 0, 250, 3, &[][..]),
    ];

    for (name, desc, price, discount, weight, stock, sizes) in products {
        let row: Option<(Uuid,)> = sqlx::query_as(
            r#"
            INSERT INTO products
                (id, vendor_id, category_id, name, description, price, discount_price,
                 weight_grams, available, on_sale, slug)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (slug) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vendor_id)
        .bind(category_id)
        .bind(name)
        .bind(desc)
        .bind(price as i64)
        .bind(discount as i64)
        .bind(weight as i64)
        .bind(stock as i32)
        .bind(discount > 0)
        .bind(slugify(name))
        .fetch_optional(pool)
        .await?;

        let Some((product_id,)) = row else { continue };
        for size in sizes {
            sqlx::query(
                "INSERT INTO product_sizes (id, product_id, name) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
            )
            .bind(Uuid::new_v4())
            .bind(product_id)
            .bind(*size)
            .execute(pool)
            .await?;
        }
    }

    println!("Seeded products");
    Ok(())
}

async fn seed_coupon(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO coupons (id, code, valid_from, valid_to, discount, active)
        VALUES ($1, $2, $3, $4, $5, TRUE)
        ON CONFLICT (code) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind("WELCOME10")
    .bind(now - Duration::days(1))
    .bind(now + Duration::days(90))
    .bind(10_i32)
    .execute(pool)
    .await?;
    println!("Seeded coupon WELCOME10");
    Ok(())
}

async fn seed_site(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let (settings,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM site_settings")
        .fetch_one(pool)
        .await?;
    if settings == 0 {
        sqlx::query(
            r#"
            INSERT INTO site_settings (id, site_name, site_title, description, shipping_fee)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind("Marketplace")
        .bind("Multi-vendor marketplace")
        .bind("Shop from independent vendors")
        .bind(500_i64)
        .execute(pool)
        .await?;
    }

    let (contacts,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contact_infos")
        .fetch_one(pool)
        .await?;
    if contacts == 0 {
        sqlx::query(
            r#"
            INSERT INTO contact_infos (id, description, full_address, phone, email, work_time)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind("Customer support")
        .bind("1 Market Street")
        .bind("+1 555 0100")
        .bind("support@example.com")
        .bind("Sun-Thu 9:00-17:00")
        .execute(pool)
        .await?;
    }

    println!("Seeded site settings");
    Ok(())
}
