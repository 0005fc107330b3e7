mod common;

use marketplace_api::{
    dto::{
        pages::{CreatePageRequest, UpdatePageRequest},
        vendor::SocialLinksRequest,
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::Role,
    routes::params::{Pagination, ProductSortBy, SortOrder, StorefrontQuery, VendorQuery},
    services::{auth_service, page_service, storefront_service, vendor_service},
};

#[tokio::test]
async fn only_admitted_vendors_have_a_storefront() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let admin = common::admin_user(&state).await?;
    let north = common::admitted_vendor(&state, &admin, "north@example.com").await?;
    common::admitted_vendor(&state, &admin, "south@example.com").await?;

    // Applied but not admitted.
    let pending = common::register(&state, "pending@example.com", None).await?;
    auth_service::apply_vendor(
        &state,
        &AuthUser {
            user_id: pending.user.id,
            role: Role::Customer.as_str().into(),
        },
    )
    .await?;

    let directory = storefront_service::list_vendors(&state, VendorQuery::default()).await?;
    let meta = directory.meta.clone().unwrap();
    let slugs: Vec<String> = directory
        .data
        .unwrap()
        .items
        .into_iter()
        .map(|v| v.slug)
        .collect();
    assert_eq!(meta.total, Some(2));
    assert!(slugs.contains(&"north".to_string()));
    assert!(!slugs.contains(&pending.profile.slug));

    let searched = storefront_service::list_vendors(
        &state,
        VendorQuery {
            q: Some("sou".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(searched.items.len(), 1);
    assert_eq!(searched.items[0].slug, "south");

    let hidden = storefront_service::vendor_storefront(&state, &pending.profile.slug).await;
    assert!(matches!(hidden, Err(AppError::NotFound)));

    vendor_service::save_social_links(
        &state,
        &north,
        SocialLinksRequest {
            facebook: Some("https://facebook.com/north".into()),
            twitter: None,
            instagram: Some("https://instagram.com/north".into()),
            pinterest: None,
        },
    )
    .await?;
    common::listed_product(&state, &north, "Mug", 700, 5).await?;

    let shop = storefront_service::vendor_storefront(&state, "north")
        .await?
        .data
        .unwrap();
    assert_eq!(shop.vendor.slug, "north");
    assert_eq!(shop.product_count, 1);
    let links = shop.social_links.unwrap();
    assert_eq!(links.facebook.as_deref(), Some("https://facebook.com/north"));
    assert!(links.twitter.is_none());

    Ok(())
}

#[tokio::test]
async fn storefront_lists_only_the_vendors_live_products() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let admin = common::admin_user(&state).await?;
    let north = common::admitted_vendor(&state, &admin, "north@example.com").await?;
    let south = common::admitted_vendor(&state, &admin, "south@example.com").await?;
    common::listed_product(&state, &north, "Mug", 700, 5).await?;
    common::listed_product(&state, &north, "Bowl", 300, 5).await?;
    let retired = common::listed_product(&state, &north, "Vase", 900, 5).await?;
    common::listed_product(&state, &south, "Lamp", 2500, 5).await?;
    vendor_service::delete_product(&state, &north, retired.id).await?;

    let resp = storefront_service::vendor_products(
        &state,
        "north",
        StorefrontQuery {
            sort_by: Some(ProductSortBy::Price),
            sort_order: Some(SortOrder::Asc),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(resp.meta.clone().unwrap().total, Some(2));
    let names: Vec<String> = resp.data.unwrap().items.into_iter().map(|p| p.name).collect();
    assert_eq!(names, ["Bowl", "Mug"]);

    let paged = storefront_service::vendor_products(
        &state,
        "north",
        StorefrontQuery {
            page: Some(2),
            per_page: Some(1),
            sort_by: Some(ProductSortBy::Price),
            sort_order: Some(SortOrder::Asc),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(paged.items.len(), 1);
    assert_eq!(paged.items[0].name, "Mug");

    let unknown =
        storefront_service::vendor_products(&state, "nobody", StorefrontQuery::default()).await;
    assert!(matches!(unknown, Err(AppError::NotFound)));

    Ok(())
}

#[tokio::test]
async fn pages_are_published_by_slug_while_active() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let admin = common::admin_user(&state).await?;
    let buyer = common::customer(&common::register(&state, "buyer@example.com", None).await?);

    let new_page = |name: &str, slug: Option<&str>| CreatePageRequest {
        name: name.into(),
        content: format!("{name} body"),
        slug: slug.map(str::to_string),
        active: None,
    };

    let forbidden = page_service::create_page(&state, &buyer, new_page("About Us", None)).await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    let about = page_service::create_page(&state, &admin, new_page("About Us", None))
        .await?
        .data
        .unwrap();
    assert_eq!(about.slug, "about-us");
    assert!(about.active);

    // Same name gets a suffixed slug; an explicit duplicate slug is refused.
    let again = page_service::create_page(&state, &admin, new_page("About Us", None))
        .await?
        .data
        .unwrap();
    assert_ne!(again.slug, about.slug);
    assert!(again.slug.starts_with("about-us-"));
    let taken =
        page_service::create_page(&state, &admin, new_page("Company", Some("About Us"))).await;
    assert!(matches!(taken, Err(AppError::Conflict(_))));

    let terms = page_service::create_page(&state, &admin, new_page("Terms", Some("terms")))
        .await?
        .data
        .unwrap();
    assert_eq!(
        page_service::get_page(&state, "terms").await?.data.unwrap().id,
        terms.id
    );

    page_service::update_page(
        &state,
        &admin,
        terms.id,
        UpdatePageRequest {
            active: Some(false),
            ..Default::default()
        },
    )
    .await?;
    let hidden = page_service::get_page(&state, "terms").await;
    assert!(matches!(hidden, Err(AppError::NotFound)));

    let public = page_service::list_pages(&state, Pagination::default())
        .await?
        .data
        .unwrap();
    assert_eq!(public.items.len(), 2);
    assert!(public.items.iter().all(|p| p.active));
    let everything = page_service::admin_list_pages(&state, &admin, Pagination::default())
        .await?
        .data
        .unwrap();
    assert_eq!(everything.items.len(), 3);

    page_service::delete_page(&state, &admin, again.id).await?;
    let gone = page_service::delete_page(&state, &admin, again.id).await;
    assert!(matches!(gone, Err(AppError::NotFound)));

    Ok(())
}
