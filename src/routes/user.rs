use axum::{extract::State, response::Json};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::error::{AppError, AppJson, AppPath, AppResult};
use crate::models::user::{UpdateUserStatusRequest, User, STATUS_ACTIVE, STATUS_INACTIVE};
use crate::state::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Value>> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(json!({
        "status": "success",
        "data": users
    })))
}

pub async fn update_user_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateUserStatusRequest>,
) -> AppResult<Json<Value>> {
    // Validasi status hanya "active" atau "inactive"
    let status = payload.status.trim();
    if status != STATUS_ACTIVE && status != STATUS_INACTIVE {
        return Err(AppError::InvalidInput(
            "Status harus 'active' atau 'inactive'.".into(),
        ));
    }

    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status)
    .bind(Utc::now())
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("User tidak ditemukan.".into()))?;

    tracing::info!(admin_id = %admin.id, user_id = %user.id, status = %user.status, "User status updated");

    Ok(Json(json!({
        "status": "success",
        "message": "Status user berhasil diperbarui!",
        "data": user
    })))
}
