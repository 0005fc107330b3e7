use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{ContactInfo, SiteSettings};

#[derive(Debug, Serialize, ToSchema)]
pub struct SiteInfo {
    pub settings: Option<SiteSettings>,
    pub contacts: Vec<ContactInfo>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct NewsletterRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 150))]
    pub subject: String,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}
