use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 150))]
    pub display_name: Option<String>,
    pub referral_code: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct OtpRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OtpRequested {
    pub status: String,
    pub temp_token: String,
}

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct OtpVerifyRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(equal = 6, message = "OTP must be 6 digits"))]
    pub otp: String,
}

#[derive(Deserialize, Debug, ToSchema, Validate, Default)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 150))]
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub mobile_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub post_code: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}
