use axum::{
    Json,
    extract::State,
    http::{HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use common::Role;
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AUTH_COOKIE, AuthUser};
use crate::extractors::json::AppJson;
use crate::models::auth::{
    AuthResponse, LoginRequest, RegisterRequest, UserResponse, normalize_email,
    validate_login_request, validate_register_request,
};
use crate::state::AppState;
use crate::utils::{hash, jwt};

/// `Set-Cookie` value carrying the session token.
fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie =
        format!("{AUTH_COOKIE}={token}; Path=/; Max-Age={max_age_secs}; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn with_session_cookie(
    state: &AppState,
    status: StatusCode,
    body: AuthResponse,
) -> Result<Response, AppError> {
    let auth = &state.config.auth;
    let cookie = session_cookie(&body.token, auth.token_ttl_days * 24 * 60 * 60, auth.cookie_secure);
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::Internal(format!("Invalid cookie header: {}", e)))?;
    Ok((status, [(SET_COOKIE, cookie)], Json(body)).into_response())
}

fn issue_token(state: &AppState, user: &user::Model) -> Result<String, AppError> {
    jwt::sign(
        user.id,
        &user.email,
        user.role,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_days,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))
}

#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    operation_id = "register",
    summary = "Register a new user",
    description = "Creates an account and signs it in. `role` defaults to `judge`; creating an `admin` requires an admin caller. Sets the `auth-token` cookie.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = AuthResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Only admins can create admins (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Email already registered (EMAIL_TAKEN)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, caller, payload), fields(email = %payload.email))]
pub async fn register(
    caller: Option<AuthUser>,
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<Response, AppError> {
    validate_register_request(&payload)?;

    let role = payload.role.unwrap_or_default();
    if role == Role::Admin && !caller.as_ref().is_some_and(AuthUser::is_admin) {
        return Err(AppError::admin_required());
    }

    let email = normalize_email(&payload.email);
    let exists = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .is_some();
    if exists {
        return Err(AppError::EmailTaken);
    }

    let password = hash::hash_password_blocking(payload.password)
        .await
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let now = chrono::Utc::now();
    let new_user = user::ActiveModel {
        email: Set(email),
        name: Set(payload.name.trim().to_string()),
        password: Set(password),
        role: Set(role),
        expertise: Set(payload.expertise.map(|e| e.trim().to_string())),
        avatar: Set(payload.avatar),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let user = new_user.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Registration race condition: unique constraint caught on insert");
            AppError::EmailTaken
        }
        _ => AppError::from(e),
    })?;

    tracing::info!(user_id = user.id, role = %user.role, "User registered");

    let token = issue_token(&state, &user)?;
    with_session_cookie(
        &state,
        StatusCode::CREATED,
        AuthResponse {
            token,
            user: user.into(),
        },
    )
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Log in with email and password",
    description = "Returns a JWT and sets the `auth-token` cookie. Deactivated accounts are refused.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong email or password (INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 403, description = "Account deactivated (ACCOUNT_DISABLED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Response, AppError> {
    validate_login_request(&payload)?;

    let user = user::Entity::find()
        .filter(user::Column::Email.eq(normalize_email(&payload.email)))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password_blocking(payload.password, user.password.clone())
        .await
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }
    if !user.is_active {
        return Err(AppError::AccountDisabled);
    }

    let token = issue_token(&state, &user)?;
    with_session_cookie(
        &state,
        StatusCode::OK,
        AuthResponse {
            token,
            user: user.into(),
        },
    )
}

#[utoipa::path(
    post,
    path = "/logout",
    tag = "Auth",
    operation_id = "logout",
    summary = "Clear the session cookie",
    responses((status = 204, description = "Cookie cleared")),
)]
pub async fn logout(State(state): State<AppState>) -> Result<Response, AppError> {
    let cookie = HeaderValue::from_str(&session_cookie("", 0, state.config.auth.cookie_secure))
        .map_err(|e| AppError::Internal(format!("Invalid cookie header: {}", e)))?;
    Ok((StatusCode::NO_CONTENT, [(SET_COOKIE, cookie)]).into_response())
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "getCurrentUser",
    summary = "Get the current user",
    description = "Returns the caller's account as currently stored, so role or status changes made after login are visible.",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Account deactivated (ACCOUNT_DISABLED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::TokenInvalid)?;
    if !user.is_active {
        return Err(AppError::AccountDisabled);
    }
    Ok(Json(user.into()))
}
