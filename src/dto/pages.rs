use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::Page;

#[derive(Debug, Serialize, ToSchema)]
pub struct PageList {
    pub items: Vec<Page>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreatePageRequest {
    #[validate(length(min = 1, max = 300))]
    pub name: String,
    #[validate(length(min = 1))]
    pub content: String,
    /// Defaults to a slug of `name`.
    #[validate(length(min = 1, max = 300))]
    pub slug: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema, Validate, Default)]
pub struct UpdatePageRequest {
    #[validate(length(min = 1, max = 300))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    pub active: Option<bool>,
}
