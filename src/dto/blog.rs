use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Comment, Post};

#[derive(Debug, Serialize, ToSchema)]
pub struct PostList {
    pub items: Vec<Post>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentList {
    pub items: Vec<Comment>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub tags: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate, Default)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 300))]
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub tags: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 1, max = 5000))]
    pub body: String,
}

/// Request metadata recorded with a post view.
#[derive(Debug, Default, Clone)]
pub struct ViewContext {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referral: Option<String>,
}
