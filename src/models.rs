use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    bank_accounts, categories, comments, contact_infos, coupons, order_details, order_suppliers,
    orders, pages, payments, posts, product_ratings, product_sizes, products, profiles,
    site_settings, social_links, users, vendor_payments,
};
use crate::error::AppError;

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = AppError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok($name::$variant),)+
                    other => Err(AppError::BadRequest(format!(
                        "Invalid {}: {other}",
                        stringify!($name)
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(Role {
    Customer => "customer",
    Vendor => "vendor",
    Admin => "admin",
});

string_enum!(
    /// Lifecycle of an order and of each vendor split.
    OrderStatus {
        Pending => "pending",
        Underway => "underway",
        Complete => "complete",
        Refunded => "refunded",
    }
);

string_enum!(PayoutStatus {
    Pending => "pending",
    Progressing => "progressing",
    Paid => "paid",
    Refunded => "refunded",
});

string_enum!(PayoutMethod {
    Bank => "bank",
    Paypal => "paypal",
});

string_enum!(PaymentMethod {
    Balance => "balance",
    Cash => "cash",
    Stripe => "stripe",
    Razorpay => "razorpay",
    Paypal => "paypal",
    Paymob => "paymob",
    Myfatoorah => "myfatoorah",
});

string_enum!(Promotional {
    New => "new",
    Hot => "hot",
});

string_enum!(
    /// Depth in the four-level category tree.
    CategoryLevel {
        Super => "super",
        Main => "main",
        Sub => "sub",
        Mini => "mini",
    }
);

impl CategoryLevel {
    pub fn child(&self) -> Option<CategoryLevel> {
        match self {
            CategoryLevel::Super => Some(CategoryLevel::Main),
            CategoryLevel::Main => Some(CategoryLevel::Sub),
            CategoryLevel::Sub => Some(CategoryLevel::Mini),
            CategoryLevel::Mini => None,
        }
    }
}

impl OrderStatus {
    /// Splits follow the order; any status past pending means the split is settled.
    pub fn marks_finished(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub mobile_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub post_code: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub image_url: Option<String>,
    pub is_verified: bool,
    pub status: String,
    pub admission: bool,
    pub referral_code: String,
    pub recommended_by: Option<Uuid>,
    pub referrals: i32,
    pub balance: i64,
    pub requested: i64,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// Public face of an admitted vendor; no balances or contact details.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct VendorCard {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub slug: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Account {
    pub user: User,
    pub profile: Profile,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Category {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub level: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    #[schema(no_recursion)]
    pub children: Vec<CategoryNode>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Product {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub content: Option<String>,
    pub price: i64,
    pub discount_price: i64,
    pub effective_price: i64,
    pub weight_grams: i64,
    pub available: i32,
    pub sku: Option<String>,
    pub on_sale: bool,
    pub promotional: Option<String>,
    pub is_active: bool,
    pub tags: Option<String>,
    pub image_url: Option<String>,
    pub slug: String,
    pub rating_average: i32,
    pub rating_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ProductSize {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    pub product: Product,
    pub sizes: Vec<ProductSize>,
    pub vendor_name: Option<String>,
    pub vendor_slug: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ProductRating {
    pub id: Uuid,
    pub product_id: Uuid,
    pub client_id: Uuid,
    pub rate: i32,
    pub comment: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub discount: i32,
    pub active: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub email_client: Option<String>,
    pub coupon_id: Option<Uuid>,
    pub sub_total: i64,
    pub discount: i64,
    pub shipping: i64,
    pub amount: i64,
    pub weight_grams: i64,
    pub tracking_no: Option<String>,
    pub label_url: Option<String>,
    pub status: String,
    pub is_finished: bool,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct OrderLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub supplier_id: Uuid,
    pub product_name: Option<String>,
    pub product_slug: Option<String>,
    pub price: i64,
    pub quantity: i32,
    pub size: Option<String>,
    pub weight_grams: i64,
    pub line_total: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct OrderSupplier {
    pub id: Uuid,
    pub order_id: Uuid,
    pub vendor_id: Uuid,
    pub sub_total: i64,
    pub amount: i64,
    pub weight_grams: i64,
    pub status: String,
    pub is_finished: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Billing {
    pub id: Uuid,
    pub order_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub country_code: String,
    pub state: Option<String>,
    pub city: String,
    pub street_address: String,
    pub post_code: Option<String>,
    pub email: String,
    pub phone: String,
    pub payment_method: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct VendorPayment {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub request_amount: i64,
    pub fee: i64,
    pub description: Option<String>,
    pub status: String,
    pub method: String,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct BankAccount {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub bank_name: String,
    pub account_number: String,
    pub swift_code: Option<String>,
    pub account_name: String,
    pub country: Option<String>,
    pub paypal_email: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SocialLinks {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub pinterest: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub views: i64,
    pub tags: Option<String>,
    pub slug: String,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub name: String,
    pub body: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Page {
    pub id: Uuid,
    pub name: String,
    pub content: String,
    pub slug: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SiteSettings {
    pub site_name: String,
    pub site_title: String,
    pub description: String,
    pub site_url: Option<String>,
    pub shipping_fee: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ContactInfo {
    pub id: Uuid,
    pub description: String,
    pub full_address: String,
    pub phone: String,
    pub email: String,
    pub work_time: String,
    pub map_link: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct MonthlyPoint {
    pub month: u32,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostReportDay {
    pub created_on: NaiveDate,
    pub impressions: i64,
}

pub fn user_from_entity(model: users::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        role: model.role,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn profile_from_entity(model: profiles::Model) -> Profile {
    Profile {
        id: model.id,
        user_id: model.user_id,
        display_name: model.display_name,
        bio: model.bio,
        mobile_number: model.mobile_number,
        address: model.address,
        city: model.city,
        post_code: model.post_code,
        country: model.country,
        state: model.state,
        image_url: model.image_url,
        is_verified: model.is_verified,
        status: model.status,
        admission: model.admission,
        referral_code: model.referral_code,
        recommended_by: model.recommended_by,
        referrals: model.referrals,
        balance: model.balance,
        requested: model.requested,
        slug: model.slug,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn vendor_card_from_entity(model: profiles::Model) -> VendorCard {
    VendorCard {
        id: model.id,
        display_name: model.display_name,
        slug: model.slug,
        bio: model.bio,
        image_url: model.image_url,
        city: model.city,
        country: model.country,
        joined_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn category_from_entity(model: categories::Model) -> Category {
    Category {
        id: model.id,
        parent_id: model.parent_id,
        level: model.level,
        name: model.name,
        slug: model.slug,
        description: model.description,
        image_url: model.image_url,
    }
}

pub fn product_from_entity(model: products::Model) -> Product {
    let effective_price =
        crate::pricing::effective_price(model.price, model.discount_price, model.on_sale);
    Product {
        id: model.id,
        vendor_id: model.vendor_id,
        category_id: model.category_id,
        name: model.name,
        description: model.description,
        content: model.content,
        price: model.price,
        discount_price: model.discount_price,
        effective_price,
        weight_grams: model.weight_grams,
        available: model.available,
        sku: model.sku,
        on_sale: model.on_sale,
        promotional: model.promotional,
        is_active: model.is_active,
        tags: model.tags,
        image_url: model.image_url,
        slug: model.slug,
        rating_average: model.rating_average,
        rating_count: model.rating_count,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn size_from_entity(model: product_sizes::Model) -> ProductSize {
    ProductSize {
        id: model.id,
        product_id: model.product_id,
        name: model.name,
    }
}

pub fn rating_from_entity(model: product_ratings::Model) -> ProductRating {
    ProductRating {
        id: model.id,
        product_id: model.product_id,
        client_id: model.client_id,
        rate: model.rate,
        comment: model.comment,
        active: model.active,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn coupon_from_entity(model: coupons::Model) -> Coupon {
    Coupon {
        id: model.id,
        code: model.code,
        valid_from: model.valid_from.with_timezone(&Utc),
        valid_to: model.valid_to.with_timezone(&Utc),
        discount: model.discount,
        active: model.active,
    }
}

pub fn order_from_entity(model: orders::Model) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        email_client: model.email_client,
        coupon_id: model.coupon_id,
        sub_total: model.sub_total,
        discount: model.discount,
        shipping: model.shipping,
        amount: model.amount,
        weight_grams: model.weight_grams,
        tracking_no: model.tracking_no,
        label_url: model.label_url,
        status: model.status,
        is_finished: model.is_finished,
        payment_method: model.payment_method,
        payment_reference: model.payment_reference,
        paid_at: model.paid_at.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub fn order_line_from_entity(
    model: order_details::Model,
    product: Option<products::Model>,
) -> OrderLine {
    OrderLine {
        id: model.id,
        product_id: model.product_id,
        supplier_id: model.supplier_id,
        product_name: product.as_ref().map(|p| p.name.clone()),
        product_slug: product.map(|p| p.slug),
        price: model.price,
        quantity: model.quantity,
        size: model.size,
        weight_grams: model.weight_grams,
        line_total: crate::pricing::line_total(model.price, model.quantity),
    }
}

pub fn order_supplier_from_entity(model: order_suppliers::Model) -> OrderSupplier {
    OrderSupplier {
        id: model.id,
        order_id: model.order_id,
        vendor_id: model.vendor_id,
        sub_total: model.sub_total,
        amount: model.amount,
        weight_grams: model.weight_grams,
        status: model.status,
        is_finished: model.is_finished,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn billing_from_entity(model: payments::Model) -> Billing {
    Billing {
        id: model.id,
        order_id: model.order_id,
        first_name: model.first_name,
        last_name: model.last_name,
        country: model.country,
        country_code: model.country_code,
        state: model.state,
        city: model.city,
        street_address: model.street_address,
        post_code: model.post_code,
        email: model.email,
        phone: model.phone,
        payment_method: model.payment_method,
    }
}

pub fn vendor_payment_from_entity(model: vendor_payments::Model) -> VendorPayment {
    VendorPayment {
        id: model.id,
        vendor_id: model.vendor_id,
        request_amount: model.request_amount,
        fee: model.fee,
        description: model.description,
        status: model.status,
        method: model.method,
        comment: model.comment,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub fn bank_account_from_entity(model: bank_accounts::Model) -> BankAccount {
    BankAccount {
        id: model.id,
        vendor_id: model.vendor_id,
        bank_name: model.bank_name,
        account_number: model.account_number,
        swift_code: model.swift_code,
        account_name: model.account_name,
        country: model.country,
        paypal_email: model.paypal_email,
        description: model.description,
    }
}

pub fn social_links_from_entity(model: social_links::Model) -> SocialLinks {
    SocialLinks {
        id: model.id,
        vendor_id: model.vendor_id,
        facebook: model.facebook,
        twitter: model.twitter,
        instagram: model.instagram,
        pinterest: model.pinterest,
    }
}

pub fn post_from_entity(model: posts::Model) -> Post {
    Post {
        id: model.id,
        title: model.title,
        content: model.content,
        category_id: model.category_id,
        author_id: model.author_id,
        image_url: model.image_url,
        views: model.views,
        tags: model.tags,
        slug: model.slug,
        published_at: model.published_at.with_timezone(&Utc),
    }
}

pub fn comment_from_entity(model: comments::Model) -> Comment {
    Comment {
        id: model.id,
        post_id: model.post_id,
        name: model.name,
        body: model.body,
        active: model.active,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn page_from_entity(model: pages::Model) -> Page {
    Page {
        id: model.id,
        name: model.name,
        content: model.content,
        slug: model.slug,
        active: model.active,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub fn site_settings_from_entity(model: site_settings::Model) -> SiteSettings {
    SiteSettings {
        site_name: model.site_name,
        site_title: model.site_title,
        description: model.description,
        site_url: model.site_url,
        shipping_fee: model.shipping_fee,
    }
}

pub fn contact_info_from_entity(model: contact_infos::Model) -> ContactInfo {
    ContactInfo {
        id: model.id,
        description: model.description,
        full_address: model.full_address,
        phone: model.phone,
        email: model.email,
        work_time: model.work_time,
        map_link: model.map_link,
    }
}
