use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{SocialLinks, VendorCard};

#[derive(Debug, Serialize, ToSchema)]
pub struct VendorDirectory {
    pub items: Vec<VendorCard>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VendorStorefront {
    pub vendor: VendorCard,
    pub social_links: Option<SocialLinks>,
    /// Listed products currently on offer.
    pub product_count: i64,
}
