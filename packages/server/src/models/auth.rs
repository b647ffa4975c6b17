use chrono::{DateTime, Utc};
use common::Role;
use serde::{Deserialize, Serialize};

use super::shared::{validate_optional_url, validate_text};
use crate::error::AppError;

/// Request body for user registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Display name (1-100 characters).
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    /// Login email; stored lower-cased.
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
    /// Defaults to `judge`. Creating an `admin` requires an admin caller.
    pub role: Option<Role>,
    #[schema(example = "Machine learning")]
    pub expertise: Option<String>,
    pub avatar: Option<String>,
}

/// Normalise an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimal shape check: one `@`, non-empty local part, a dot in the domain.
pub fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let valid = email.len() <= 254
        && !email.chars().any(char::is_whitespace)
        && match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain
                        .split_once('.')
                        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                    && !domain.ends_with('.')
            }
            None => false,
        };
    if !valid {
        return Err(AppError::Validation(
            "Please provide a valid email address".into(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    let len = password.chars().count();
    if !(8..=128).contains(&len) {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    validate_text("Name", &payload.name, 100)?;
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;
    if let Some(ref expertise) = payload.expertise
        && expertise.chars().count() > 200
    {
        return Err(AppError::Validation(
            "Expertise must be at most 200 characters".into(),
        ));
    }
    validate_optional_url("Avatar", payload.avatar.as_deref())
}

/// Request body for user login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::Validation("Email must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Public view of a user account. Never includes the password hash.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub role: Role,
    pub expertise: Option<String>,
    pub avatar: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::user::Model> for UserResponse {
    fn from(user: crate::entity::user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            expertise: user.expertise,
            avatar: user.avatar,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// Successful registration or login. The token is also set as the
/// `auth-token` cookie.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    /// JWT access token (HS256).
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    pub user: UserResponse,
}
