use axum::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::auth::jwt;
use crate::database::with_timeout;
use crate::error::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// The caller behind a valid bearer token. Only active users get through.
pub struct AuthUser(pub User);

/// An authenticated caller with the `admin` role.
pub struct AdminUser(pub User);

pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthenticated("Token diperlukan.".into()))?;
    let value = header
        .to_str()
        .map_err(|_| AppError::Unauthenticated("Format token tidak valid.".into()))?;

    match value.split_once(' ') {
        Some(("Bearer", token)) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AppError::Unauthenticated("Format token tidak valid.".into())),
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = jwt::verify_token(token, &state.config.jwt_secret)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthenticated("Klaim token tidak valid.".into()))?;

        let user = with_timeout(
            state.config.store_timeout,
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&state.db),
        )
        .await?
        .ok_or_else(|| AppError::Unauthenticated("User tidak ditemukan.".into()))?;

        if !user.is_active() {
            return Err(AppError::Forbidden("User belum aktif.".into()));
        }

        Ok(AuthUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Forbidden("Hanya admin yang dapat mengakses.".into()));
        }
        Ok(AdminUser(user))
    }
}
