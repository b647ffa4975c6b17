use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::CookieJar;
use common::Role;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Name of the cookie that carries the session token for browser clients.
pub const AUTH_COOKIE: &str = "auth-token";

/// Authenticated user extracted from `Authorization: Bearer <token>` or the
/// `auth-token` cookie.
///
/// Add this as a handler parameter to require authentication.
/// Role checks happen via `require_admin()` / `require_judge()` in the handler body.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Returns `Ok(())` for admins, `Err(PermissionDenied)` otherwise.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role.satisfies(Role::Admin) {
            Ok(())
        } else {
            Err(AppError::admin_required())
        }
    }

    /// Returns `Ok(())` for judges and admins.
    pub fn require_judge(&self) -> Result<(), AppError> {
        if self.role.satisfies(Role::Judge) {
            Ok(())
        } else {
            Err(AppError::judge_required())
        }
    }
}

/// Pull the raw token from the request. The header wins over the cookie.
fn token_from_parts(parts: &Parts) -> Result<Option<String>, AppError> {
    if let Some(value) = parts.headers.get(AUTHORIZATION) {
        let header = value.to_str().map_err(|_| AppError::TokenInvalid)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;
        return Ok(Some(token.to_owned()));
    }

    let jar = CookieJar::from_headers(&parts.headers);
    Ok(jar.get(AUTH_COOKIE).map(|c| c.value().to_owned()))
}

fn decode(token: &str, state: &AppState) -> Result<AuthUser, AppError> {
    let claims =
        jwt::verify(token, &state.config.auth.jwt_secret).map_err(|_| AppError::TokenInvalid)?;
    Ok(AuthUser {
        user_id: claims.uid,
        email: claims.sub,
        role: claims.role,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts)?.ok_or(AppError::TokenMissing)?;
        decode(&token, state)
    }
}

/// `Option<AuthUser>`: anonymous requests yield `None`, but a token that is
/// present and bad is still rejected.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        match token_from_parts(parts)? {
            Some(token) => decode(&token, state).map(Some),
            None => Ok(None),
        }
    }
}
