use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{jwt, password};
use crate::error::{AppError, AppJson, AppResult};
use crate::models::user::{LoginRequest, RegisterRequest, User, ROLE_USER, STATUS_INACTIVE};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 6;

fn validate_register(payload: &RegisterRequest) -> AppResult<()> {
    if payload.username.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
    {
        return Err(AppError::InvalidInput(
            "Username, email dan password wajib diisi.".into(),
        ));
    }
    if !payload.email.contains('@') {
        return Err(AppError::InvalidInput("Format email tidak valid.".into()));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "Password minimal {} karakter.",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn register_conflict(err: sqlx::Error) -> AppError {
    match AppError::from_unique_violation(err, "users_username_key", "Username sudah terdaftar.") {
        AppError::Database(err) => {
            AppError::from_unique_violation(err, "users_email_key", "Email sudah terdaftar.")
        }
        other => other,
    }
}

/// New accounts start as `user`/`inactive` and wait for an admin.
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    // Validasi input
    validate_register(&payload)?;

    let password_hash = password::hash_password(&payload.password)?;

    // Insert user baru, username/email ganda ditolak oleh unique constraint
    let new_user = sqlx::query_as::<_, User>(
        r#"INSERT INTO users (id, username, email, password_hash, role, status)
           VALUES ($1, $2, $3, $4, $5, $6)
           RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.username.trim())
    .bind(payload.email.trim())
    .bind(&password_hash)
    .bind(ROLE_USER)
    .bind(STATUS_INACTIVE)
    .fetch_one(&state.db)
    .await
    .map_err(register_conflict)?;

    tracing::info!(user_id = %new_user.id, username = %new_user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Registrasi berhasil, menunggu persetujuan admin.",
            "data": new_user
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<Value>> {
    // Validasi input
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Username dan password wajib diisi.".into(),
        ));
    }

    // Cari user berdasarkan username
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(payload.username.trim())
        .fetch_optional(&state.db)
        .await?;

    let invalid = || AppError::Unauthenticated("Username atau password salah.".into());

    let user = match user {
        Some(user) => user,
        None => {
            tracing::warn!(username = %payload.username, "Login failed: unknown username");
            return Err(invalid());
        }
    };

    // Verifikasi password
    if !password::verify_password(&payload.password, &user.password_hash) {
        tracing::warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(invalid());
    }

    if !user.is_active() {
        return Err(AppError::Forbidden(
            "User belum aktif, menunggu persetujuan admin.".into(),
        ));
    }

    let token = jwt::issue_token(
        user.id,
        &user.role,
        &state.config.jwt_secret,
        state.config.token_ttl_hours,
    )?;

    Ok(Json(json!({
        "status": "success",
        "message": "Login berhasil!",
        "data": {
            "token": token,
            "user": user
        }
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn register_requires_all_fields() {
        let err = validate_register(&request("", "budi@example.com", "rahasia")).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn register_rejects_bad_email_and_short_password() {
        assert!(validate_register(&request("budi", "budi.example.com", "rahasia")).is_err());
        assert!(validate_register(&request("budi", "budi@example.com", "abc")).is_err());
        assert!(validate_register(&request("budi", "budi@example.com", "rahasia")).is_ok());
    }
}
