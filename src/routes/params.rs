use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema, Default, Clone)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Deserialize, ToSchema, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Deserialize, ToSchema, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortBy {
    CreatedAt,
    Price,
    Name,
    Rating,
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub q: Option<String>,
    pub category: Option<String>,
    pub vendor: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub on_sale: Option<bool>,
    pub promotional: Option<String>,
    pub sort_by: Option<ProductSortBy>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct AdminOrderQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
    /// `true` for placed orders only, `false` for open carts only.
    pub finished: Option<bool>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct PayoutQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct LowStockQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub threshold: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct PostQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub q: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct VendorQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Matches display name or city.
    pub q: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct StorefrontQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub sort_by: Option<ProductSortBy>,
    pub sort_order: Option<SortOrder>,
}

macro_rules! paginated {
    ($($query:ty),+) => {
        $(impl $query {
            pub fn pagination(&self) -> Pagination {
                Pagination {
                    page: self.page,
                    per_page: self.per_page,
                }
            }
        })+
    };
}

paginated!(
    ProductQuery,
    OrderListQuery,
    AdminOrderQuery,
    PayoutQuery,
    LowStockQuery,
    PostQuery,
    VendorQuery,
    StorefrontQuery
);
