pub mod audit_logs;
pub mod bank_accounts;
pub mod categories;
pub mod comments;
pub mod contact_infos;
pub mod contact_messages;
pub mod coupons;
pub mod email_otps;
pub mod newsletter_subscribers;
pub mod order_details;
pub mod order_details_suppliers;
pub mod order_suppliers;
pub mod orders;
pub mod pages;
pub mod payments;
pub mod post_reports;
pub mod post_views;
pub mod posts;
pub mod product_ratings;
pub mod product_sizes;
pub mod products;
pub mod profiles;
pub mod site_settings;
pub mod social_links;
pub mod users;
pub mod vendor_payments;
pub mod webhook_events;

pub use audit_logs::Entity as AuditLogs;
pub use bank_accounts::Entity as BankAccounts;
pub use categories::Entity as Categories;
pub use comments::Entity as Comments;
pub use contact_infos::Entity as ContactInfos;
pub use contact_messages::Entity as ContactMessages;
pub use coupons::Entity as Coupons;
pub use email_otps::Entity as EmailOtps;
pub use newsletter_subscribers::Entity as NewsletterSubscribers;
pub use order_details::Entity as OrderDetails;
pub use order_details_suppliers::Entity as OrderDetailsSuppliers;
pub use order_suppliers::Entity as OrderSuppliers;
pub use orders::Entity as Orders;
pub use pages::Entity as Pages;
pub use payments::Entity as Payments;
pub use post_reports::Entity as PostReports;
pub use post_views::Entity as PostViews;
pub use posts::Entity as Posts;
pub use product_ratings::Entity as ProductRatings;
pub use product_sizes::Entity as ProductSizes;
pub use products::Entity as Products;
pub use profiles::Entity as Profiles;
pub use site_settings::Entity as SiteSettings;
pub use social_links::Entity as SocialLinks;
pub use users::Entity as Users;
pub use vendor_payments::Entity as VendorPayments;
pub use webhook_events::Entity as WebhookEvents;
