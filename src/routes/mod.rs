use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod blog;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod doc;
pub mod health;
pub mod orders;
pub mod pages;
pub mod params;
pub mod products;
pub mod site;
pub mod vendor;
pub mod vendors;
pub mod webhooks;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/categories", categories::router())
        .nest("/products", products::router())
        .nest("/cart", cart::router())
        .nest("/checkout", checkout::router())
        .nest("/orders", orders::router())
        .nest("/vendor", vendor::router())
        .nest("/vendors", vendors::router())
        .nest("/admin", admin::router())
        .nest("/blog", blog::router())
        .nest("/site", site::router())
        .nest("/pages", pages::router())
        .nest("/webhooks", webhooks::router())
}
