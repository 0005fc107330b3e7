use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin, auth as auth_dto, blog as blog_dto, cart as cart_dto, catalog,
        checkout as checkout_dto, orders as order_dto, pages as page_dto, products as product_dto,
        site as site_dto, storefront, vendor as vendor_dto,
    },
    models::{
        Account, BankAccount, Billing, Category, CategoryLevel, CategoryNode, Comment, ContactInfo,
        Coupon, MonthlyPoint, Order, OrderLine, OrderStatus, OrderSupplier, Page, PaymentMethod,
        PayoutMethod, PayoutStatus, Post, PostReportDay, Product, ProductDetail, ProductRating,
        ProductSize, Profile, Promotional, Role, SiteSettings, SocialLinks, User, VendorCard,
        VendorPayment,
    },
    response::{ApiResponse, Meta},
    routes::{
        admin as admin_routes, auth, blog, cart, categories, checkout, health, orders, pages,
        products, site, vendor, vendors, webhooks,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::request_otp,
        auth::verify_otp,
        auth::me,
        auth::update_profile,
        auth::change_password,
        auth::apply_vendor,
        categories::category_tree,
        categories::category_products,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        products::list_products,
        products::get_product,
        products::list_ratings,
        products::rate_product,
        cart::view_cart,
        cart::add_to_cart,
        cart::remove_cart_item,
        cart::apply_coupon,
        cart::remove_coupon,
        checkout::submit_billing,
        checkout::pay_with_balance,
        checkout::pay_cash,
        checkout::stripe_session,
        checkout::razorpay_order,
        checkout::razorpay_verify,
        checkout::paypal_verify,
        checkout::paymob_session,
        checkout::paymob_callback,
        checkout::myfatoorah_session,
        checkout::myfatoorah_callback,
        webhooks::stripe_webhook,
        orders::list_orders,
        orders::get_order,
        vendor::dashboard,
        vendor::list_products,
        vendor::create_product,
        vendor::update_product,
        vendor::delete_product,
        vendor::add_size,
        vendor::remove_size,
        vendor::list_orders,
        vendor::get_order,
        vendor::bank_account,
        vendor::save_bank_account,
        vendor::social_links,
        vendor::save_social_links,
        vendor::payouts,
        vendor::request_payout,
        vendor::reviews,
        admin_routes::list_all_orders,
        admin_routes::get_order,
        admin_routes::update_order_status,
        admin_routes::list_coupons,
        admin_routes::create_coupon,
        admin_routes::update_coupon,
        admin_routes::delete_coupon,
        admin_routes::vendor_applications,
        admin_routes::admit_vendor,
        admin_routes::list_payouts,
        admin_routes::update_payout,
        admin_routes::low_stock_products,
        admin_routes::adjust_inventory,
        admin_routes::delete_product,
        admin_routes::sales_report,
        admin_routes::update_settings,
        admin_routes::moderate_comment,
        admin_routes::post_report,
        blog::list_posts,
        blog::get_post,
        blog::list_comments,
        blog::add_comment,
        blog::create_post,
        blog::update_post,
        blog::delete_post,
        site::site_info,
        site::subscribe,
        site::unsubscribe,
        site::contact,
        vendors::list_vendors,
        vendors::vendor_storefront,
        vendors::vendor_products,
        pages::list_pages,
        pages::get_page,
        pages::admin_list_pages,
        pages::create_page,
        pages::update_page,
        pages::delete_page
    ),
    components(
        schemas(
            Role,
            OrderStatus,
            PayoutStatus,
            PayoutMethod,
            PaymentMethod,
            Promotional,
            CategoryLevel,
            User,
            Profile,
            Account,
            Category,
            CategoryNode,
            Product,
            ProductSize,
            ProductDetail,
            ProductRating,
            Coupon,
            Order,
            OrderLine,
            OrderSupplier,
            Billing,
            VendorPayment,
            BankAccount,
            SocialLinks,
            Post,
            Comment,
            SiteSettings,
            ContactInfo,
            MonthlyPoint,
            PostReportDay,
            VendorCard,
            Page,
            auth_dto::RegisterRequest,
            auth_dto::LoginRequest,
            auth_dto::LoginResponse,
            auth_dto::OtpRequest,
            auth_dto::OtpRequested,
            auth_dto::OtpVerifyRequest,
            auth_dto::UpdateProfileRequest,
            auth_dto::ChangePasswordRequest,
            catalog::CreateCategoryRequest,
            catalog::UpdateCategoryRequest,
            catalog::CategoryTree,
            product_dto::CreateProductRequest,
            product_dto::UpdateProductRequest,
            product_dto::AddSizeRequest,
            product_dto::RateProductRequest,
            product_dto::ProductList,
            product_dto::RatingList,
            cart_dto::AddToCartRequest,
            cart_dto::ApplyCouponRequest,
            cart_dto::CartView,
            checkout_dto::BillingRequest,
            checkout_dto::CheckoutSummary,
            checkout_dto::RedirectSession,
            checkout_dto::RazorpayOrderResponse,
            checkout_dto::RazorpayVerifyRequest,
            checkout_dto::PaypalVerifyRequest,
            checkout_dto::WebhookAck,
            order_dto::OrderWithItems,
            order_dto::OrderList,
            vendor_dto::DashboardStats,
            vendor_dto::MonthlyChart,
            vendor_dto::VendorDashboard,
            vendor_dto::SplitList,
            vendor_dto::VendorOrderDetail,
            vendor_dto::BankAccountRequest,
            vendor_dto::SocialLinksRequest,
            vendor_dto::PayoutRequest,
            vendor_dto::PayoutList,
            admin::UpdateOrderStatusRequest,
            admin::InventoryAdjustRequest,
            admin::CouponRequest,
            admin::UpdateCouponRequest,
            admin::CouponList,
            admin::VendorList,
            admin::UpdatePayoutRequest,
            admin::SiteSettingsRequest,
            admin::CommentModerationRequest,
            admin::StatusCount,
            admin::SalesReport,
            blog_dto::PostList,
            blog_dto::CommentList,
            blog_dto::CreatePostRequest,
            blog_dto::UpdatePostRequest,
            blog_dto::CommentRequest,
            site_dto::SiteInfo,
            site_dto::NewsletterRequest,
            site_dto::ContactRequest,
            storefront::VendorDirectory,
            storefront::VendorStorefront,
            page_dto::PageList,
            page_dto::CreatePageRequest,
            page_dto::UpdatePageRequest,
            Meta,
            ApiResponse<Product>,
            ApiResponse<product_dto::ProductList>,
            ApiResponse<order_dto::OrderWithItems>,
            ApiResponse<order_dto::OrderList>,
            ApiResponse<cart_dto::CartView>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login, OTP and profile"),
        (name = "Categories", description = "Category tree"),
        (name = "Products", description = "Public catalog and ratings"),
        (name = "Cart", description = "Shopping cart and coupons"),
        (name = "Checkout", description = "Billing and payment gateways"),
        (name = "Webhooks", description = "Gateway callbacks"),
        (name = "Orders", description = "Customer order history"),
        (name = "Vendor", description = "Vendor panel"),
        (name = "Admin", description = "Admin endpoints"),
        (name = "Blog", description = "Posts and comments"),
        (name = "Site", description = "Site settings, newsletter and contact"),
        (name = "Storefront", description = "Public vendor directory and shops"),
        (name = "Pages", description = "Static content pages"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
