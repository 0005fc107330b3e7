pub mod admin_service;
pub mod auth_service;
pub mod blog_service;
pub mod cart_service;
pub mod category_service;
pub mod checkout_service;
pub mod order_service;
pub mod page_service;
pub mod product_service;
pub mod report_service;
pub mod site_service;
pub mod storefront_service;
pub mod vendor_service;
pub mod webhook_service;
