use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    error::ApiError,
    extractors::auth::AuthUser,
    routes::{parse_oid, validate_body},
    state::AppState,
};
use workhive_db::models::User;
use workhive_services::dao::base::DaoError;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Please provide a name"))]
    pub name: String,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    pub id_token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub avatar: Option<String>,
    pub created_at: String,
}

pub(crate) fn to_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id.unwrap().to_hex(),
        name: user.name,
        email: user.email,
        role: format!("{:?}", user.role),
        avatar: user.avatar,
        created_at: user.created_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    validate_body(&body)?;

    if state.users.find_by_email(&body.email).await.is_ok() {
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let password_hash = state.auth.hash_password(&body.password)?;
    let user = state
        .users
        .create(body.name, body.email, Some(password_hash))
        .await?;

    let user_id = user.id.unwrap();
    let issued = state.auth.generate_token(user_id, &user.email)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token: issued.token,
            expires_in: issued.expires_in,
            user: to_response(user),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .users
        .find_by_email(&body.email)
        .await
        .map_err(|_| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let password_hash = user
        .password_hash
        .as_ref()
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = state.auth.verify_password(&body.password, password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let user_id = user.id.unwrap();
    let issued = state.auth.generate_token(user_id, &user.email)?;

    Ok(Json(AuthResponse {
        token: issued.token,
        expires_in: issued.expires_in,
        user: to_response(user),
    }))
}

/// Verifies the Google ID token and creates a password-less account on
/// first sign-in.
pub async fn google(
    State(state): State<AppState>,
    Json(body): Json<GoogleLoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let profile = state.google.verify(&body.id_token).await?;

    let user = match state.users.find_by_email(&profile.email).await {
        Ok(user) => user,
        Err(DaoError::NotFound) => {
            let name = profile.name.unwrap_or_else(|| profile.email.clone());
            state.users.create(name, profile.email, None).await?
        }
        Err(e) => return Err(e.into()),
    };

    let user_id = user.id.unwrap();
    let issued = state.auth.generate_token(user_id, &user.email)?;

    Ok(Json(AuthResponse {
        token: issued.token,
        expires_in: issued.expires_in,
        user: to_response(user),
    }))
}

pub async fn me(auth: AuthUser) -> Json<UserResponse> {
    Json(to_response(auth.user))
}

/// Generates a short-lived 6-digit code gating password changes. Delivery
/// is out of band; the response never echoes the code.
pub async fn request_otp(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let otp = state.auth.generate_otp();
    let expires = state.auth.otp_expiry();

    state.users.set_otp(auth.user_id, &otp, expires).await?;
    tracing::debug!(user_id = %auth.user_id, "OTP generated");

    Ok(Json(serde_json::json!({ "message": "OTP sent to your email." })))
}

/// Multipart form: optional `name`, `password` + `otp`, and `file` (avatar).
/// A password change requires a valid, unexpired OTP.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UserResponse>, ApiError> {
    let mut name: Option<String> = None;
    let mut password: Option<String> = None;
    let mut otp: Option<String> = None;
    let mut avatar_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "name" => {
                name = Some(read_text(field).await?);
            }
            "password" => {
                password = Some(read_text(field).await?);
            }
            "otp" => {
                otp = Some(read_text(field).await?);
            }
            "file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
                avatar_bytes = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    if let Some(password) = password {
        if password.len() < 6 {
            return Err(ApiError::Validation(
                "Password must be at least 6 characters".to_string(),
            ));
        }
        verify_otp(&auth.user, otp.as_deref())?;

        let password_hash = state.auth.hash_password(&password)?;
        state.users.set_password(auth.user_id, &password_hash).await?;
    }

    let avatar = match avatar_bytes {
        Some(bytes) => {
            let key = state
                .storage
                .put(&format!("avatars/{}", auth.user_id.to_hex()), &bytes)
                .await?;
            Some(format!("/uploads/{}", key))
        }
        None => None,
    };

    state.users.update_profile(auth.user_id, name, avatar).await?;

    let user = state.users.base.find_by_id(auth.user_id).await?;
    Ok(Json(to_response(user)))
}

pub async fn user_profile(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let uid = parse_oid(&user_id, "user_id")?;
    let user = state
        .users
        .base
        .find_by_id(uid)
        .await
        .map_err(|_| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(to_response(user)))
}

fn verify_otp(user: &User, otp: Option<&str>) -> Result<(), ApiError> {
    let provided = otp.ok_or_else(|| ApiError::BadRequest("Invalid or expired OTP".to_string()))?;
    let stored = user
        .otp
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Invalid or expired OTP".to_string()))?;
    let expires = user
        .otp_expires
        .ok_or_else(|| ApiError::BadRequest("Invalid or expired OTP".to_string()))?;

    if stored != provided || expires < bson::DateTime::now() {
        return Err(ApiError::BadRequest("Invalid or expired OTP".to_string()));
    }
    Ok(())
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read field: {}", e)))
}
