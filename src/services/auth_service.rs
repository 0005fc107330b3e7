use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use rand::Rng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    config::AppConfig,
    dto::auth::{
        ChangePasswordRequest, Claims, LoginRequest, LoginResponse, OtpRequest, OtpRequested,
        OtpVerifyRequest, RegisterRequest, UpdateProfileRequest,
    },
    entity::{
        EmailOtps, Profiles, Users, email_otps,
        profiles::{self, Column as ProfileCol},
        users::{self, Column as UserCol},
    },
    error::{AppError, AppResult},
    mail,
    middleware::auth::AuthUser,
    models::{Account, Role, profile_from_entity, user_from_entity},
    response::{ApiResponse, Meta},
    slugs,
    state::AppState,
};

pub const OTP_TTL_MINUTES: i64 = 10;
pub const OTP_MAX_ATTEMPTS: i32 = 3;

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn issue_token(config: &AppConfig, user_id: Uuid, role: &str) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config.jwt_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn generate_otp() -> String {
    format!("{:06}", rand::rng().random_range(0..1_000_000u32))
}

pub(crate) async fn profile_slug_taken<C: ConnectionTrait>(db: &C, slug: String) -> AppResult<bool> {
    Ok(Profiles::find()
        .filter(ProfileCol::Slug.eq(slug))
        .count(db)
        .await?
        > 0)
}

async fn unused_referral_code<C: ConnectionTrait>(db: &C) -> AppResult<String> {
    for _ in 0..10 {
        let code = slugs::short_code(8);
        let used = Profiles::find()
            .filter(ProfileCol::ReferralCode.eq(code.as_str()))
            .count(db)
            .await?;
        if used == 0 {
            return Ok(code);
        }
    }
    Err(AppError::Internal(anyhow::anyhow!(
        "could not allocate a referral code"
    )))
}

/// Inserts a customer user with its profile. Runs inside the caller's transaction.
async fn create_account<C: ConnectionTrait>(
    db: &C,
    email: &str,
    password_hash: String,
    display_name: Option<String>,
    recommended_by: Option<Uuid>,
) -> AppResult<(users::Model, profiles::Model)> {
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        role: Set(Role::Customer.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(db)
    .await?;

    let slug_source = display_name
        .clone()
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
    let slug = slugs::unique_slug(&slug_source, |candidate| profile_slug_taken(db, candidate)).await?;
    let referral_code = unused_referral_code(db).await?;

    let profile = profiles::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        display_name: Set(display_name),
        bio: Set(None),
        mobile_number: Set(None),
        address: Set(None),
        city: Set(None),
        post_code: Set(None),
        country: Set(None),
        state: Set(None),
        image_url: Set(None),
        is_verified: Set(false),
        status: Set(Role::Customer.as_str().to_string()),
        admission: Set(false),
        referral_code: Set(referral_code),
        recommended_by: Set(recommended_by),
        referrals: Set(0),
        balance: Set(0),
        requested: Set(0),
        slug: Set(slug),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(db)
    .await?;

    Ok((user, profile))
}

pub(crate) async fn load_profile<C: ConnectionTrait>(db: &C, user_id: Uuid) -> AppResult<profiles::Model> {
    Profiles::find()
        .filter(ProfileCol::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(AppError::NotFound)
}

async fn load_account(state: &AppState, user_id: Uuid) -> AppResult<Account> {
    let user = Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let profile = load_profile(&state.orm, user_id).await?;
    Ok(Account {
        user: user_from_entity(user),
        profile: profile_from_entity(profile),
    })
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<Account>> {
    let email = normalize_email(&payload.email);
    let txn = state.orm.begin().await?;

    let exist = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .count(&txn)
        .await?;
    if exist > 0 {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let referrer = match payload
        .referral_code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
    {
        Some(code) => Some(
            Profiles::find()
                .filter(ProfileCol::ReferralCode.eq(code))
                .one(&txn)
                .await?
                .ok_or_else(|| AppError::BadRequest("Unknown referral code".into()))?,
        ),
        None => None,
    };

    let password_hash = hash_password(&payload.password)?;
    let (user, profile) = create_account(
        &txn,
        &email,
        password_hash,
        payload.display_name,
        referrer.as_ref().map(|r| r.user_id),
    )
    .await?;

    if let Some(referrer) = &referrer {
        Profiles::update_many()
            .col_expr(ProfileCol::Referrals, Expr::col(ProfileCol::Referrals).add(1))
            .filter(ProfileCol::Id.eq(referrer.id))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.id),
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id, "referred_by": referrer.map(|r| r.user_id) }),
    )
    .await;

    Ok(ApiResponse::success(
        "User created",
        Account {
            user: user_from_entity(user),
            profile: profile_from_entity(profile),
        },
        Some(Meta::empty()),
    ))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let email = normalize_email(&payload.email);
    let user = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::BadRequest("Invalid email or password".into())),
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let token = issue_token(&state.config, user.id, &user.role)?;

    audit::record(
        &state.pool,
        Some(user.id),
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token: format!("Bearer {}", token),
        },
        Some(Meta::empty()),
    ))
}

pub async fn request_email_otp(
    state: &AppState,
    payload: OtpRequest,
) -> AppResult<ApiResponse<OtpRequested>> {
    let email = normalize_email(&payload.email);
    let txn = state.orm.begin().await?;

    EmailOtps::delete_many()
        .filter(email_otps::Column::Email.eq(email.as_str()))
        .filter(email_otps::Column::IsVerified.eq(false))
        .exec(&txn)
        .await?;

    let otp = generate_otp();
    let temp_token = slugs::short_code(64);
    email_otps::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.clone()),
        otp: Set(otp.clone()),
        temp_token: Set(temp_token.clone()),
        is_verified: Set(false),
        attempts: Set(0),
        created_at: NotSet,
        expires_at: Set((Utc::now() + Duration::minutes(OTP_TTL_MINUTES)).into()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    mail::send_best_effort(state.mailer.as_ref(), mail::login_code(&email, &otp)).await;

    Ok(ApiResponse::success(
        "OTP sent",
        OtpRequested {
            status: "otp_sent".to_string(),
            temp_token,
        },
        Some(Meta::empty()),
    ))
}

pub async fn verify_email_otp(
    state: &AppState,
    payload: OtpVerifyRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let email = normalize_email(&payload.email);
    let txn = state.orm.begin().await?;
    // The row lock serializes concurrent guesses against the attempt counter.
    let record = EmailOtps::find()
        .filter(email_otps::Column::Email.eq(email.as_str()))
        .filter(email_otps::Column::IsVerified.eq(false))
        .order_by_desc(email_otps::Column::CreatedAt)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if record.expires_at.with_timezone(&Utc) < Utc::now() {
        return Err(AppError::BadRequest("OTP has expired".into()));
    }
    if record.attempts >= OTP_MAX_ATTEMPTS {
        return Err(AppError::BadRequest("Too many attempts, request a new OTP".into()));
    }

    let attempts = record.attempts + 1;
    let matches = record.otp == payload.otp.trim();
    let mut active: email_otps::ActiveModel = record.into();
    active.attempts = Set(attempts);
    if matches {
        active.is_verified = Set(true);
    }
    active.update(&txn).await?;

    if !matches {
        txn.commit().await?;
        let remaining = (OTP_MAX_ATTEMPTS - attempts).max(0);
        return Err(AppError::BadRequest(format!(
            "Invalid OTP, {remaining} attempts left"
        )));
    }

    let existing = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&txn)
        .await?;
    let (user, profile) = match existing {
        Some(user) => {
            let profile = load_profile(&txn, user.id).await?;
            (user, profile)
        }
        None => {
            let password_hash = hash_password(&slugs::short_code(32))?;
            create_account(&txn, &email, password_hash, None, None).await?
        }
    };
    let mut profile: profiles::ActiveModel = profile.into();
    profile.is_verified = Set(true);
    profile.updated_at = Set(Utc::now().into());
    profile.update(&txn).await?;
    txn.commit().await?;

    let token = issue_token(&state.config, user.id, &user.role)?;

    audit::record(
        &state.pool,
        Some(user.id),
        "user_login_otp",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token: format!("Bearer {}", token),
        },
        Some(Meta::empty()),
    ))
}

pub async fn me(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Account>> {
    let account = load_account(state, user.user_id).await?;
    Ok(ApiResponse::success("OK", account, Some(Meta::empty())))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<Account>> {
    let profile = load_profile(&state.orm, user.user_id).await?;
    let mut active: profiles::ActiveModel = profile.into();

    if let Some(display_name) = payload.display_name {
        active.display_name = Set(Some(display_name));
    }
    if let Some(bio) = payload.bio {
        active.bio = Set(Some(bio));
    }
    if let Some(mobile_number) = payload.mobile_number {
        active.mobile_number = Set(Some(mobile_number));
    }
    if let Some(address) = payload.address {
        active.address = Set(Some(address));
    }
    if let Some(city) = payload.city {
        active.city = Set(Some(city));
    }
    if let Some(post_code) = payload.post_code {
        active.post_code = Set(Some(post_code));
    }
    if let Some(country) = payload.country {
        active.country = Set(Some(country));
    }
    if let Some(region) = payload.state {
        active.state = Set(Some(region));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    let account = load_account(state, user.user_id).await?;
    Ok(ApiResponse::success("Profile updated", account, Some(Meta::empty())))
}

pub async fn change_password(
    state: &AppState,
    user: &AuthUser,
    payload: ChangePasswordRequest,
) -> AppResult<ApiResponse<()>> {
    let model = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if !verify_password(&payload.old_password, &model.password_hash)? {
        return Err(AppError::BadRequest("Old password is incorrect".into()));
    }

    let mut active: users::ActiveModel = model.into();
    active.password_hash = Set(hash_password(&payload.new_password)?);
    active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "password_change",
        "users",
        serde_json::json!({ "user_id": user.user_id }),
    )
    .await;

    Ok(ApiResponse::message("Password changed"))
}

/// Turns the caller into a vendor awaiting admission.
pub async fn apply_vendor(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Account>> {
    let txn = state.orm.begin().await?;
    let profile = load_profile(&txn, user.user_id).await?;
    if profile.status == Role::Vendor.as_str() {
        return Err(AppError::Conflict("Already applied as a vendor".into()));
    }

    let mut active: profiles::ActiveModel = profile.into();
    active.status = Set(Role::Vendor.as_str().to_string());
    active.admission = Set(false);
    active.updated_at = Set(Utc::now().into());
    active.update(&txn).await?;

    Users::update_many()
        .col_expr(UserCol::Role, Expr::value(Role::Vendor.as_str()))
        .filter(UserCol::Id.eq(user.user_id))
        .filter(UserCol::Role.ne(Role::Admin.as_str()))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "vendor_apply",
        "profiles",
        serde_json::json!({ "user_id": user.user_id }),
    )
    .await;

    let account = load_account(state, user.user_id).await?;
    Ok(ApiResponse::success("Vendor application received", account, Some(Meta::empty())))
}
