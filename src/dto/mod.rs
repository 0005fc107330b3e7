pub mod admin;
pub mod auth;
pub mod blog;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod pages;
pub mod products;
pub mod site;
pub mod storefront;
pub mod vendor;
