use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{AppError, AppJson, AppPath, AppResult};
use crate::models::siswa::{
    is_valid_status, CreateSiswaRequest, Siswa, UpdateSiswaRequest, STATUS_NONAKTIF,
};
use crate::state::AppState;

fn siswa_not_found() -> AppError {
    AppError::NotFound("Siswa tidak ditemukan.".into())
}

pub async fn get_all_siswa(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Value>> {
    let siswa = sqlx::query_as::<_, Siswa>("SELECT * FROM siswa ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(json!({
        "status": "success",
        "data": siswa
    })))
}

pub async fn get_siswa_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Value>> {
    let siswa = sqlx::query_as::<_, Siswa>("SELECT * FROM siswa WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(siswa_not_found)?;

    Ok(Json(json!({
        "status": "success",
        "data": siswa
    })))
}

/// Students start `nonaktif` until their first paid purchase.
pub async fn create_siswa(
    State(state): State<AppState>,
    _user: AuthUser,
    AppJson(payload): AppJson<CreateSiswaRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    // Validasi input
    if payload.fullname.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Nama lengkap dan email siswa wajib diisi.".into(),
        ));
    }
    if !payload.email.contains('@') {
        return Err(AppError::InvalidInput("Format email tidak valid.".into()));
    }

    let new_siswa = sqlx::query_as::<_, Siswa>(
        r#"INSERT INTO siswa (id, fullname, address, phonenumber, email, status)
           VALUES ($1, $2, $3, $4, $5, $6)
           RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.fullname.trim())
    .bind(payload.address.trim())
    .bind(payload.phonenumber.trim())
    .bind(payload.email.trim())
    .bind(STATUS_NONAKTIF)
    .fetch_one(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Siswa berhasil ditambahkan!",
            "data": new_siswa
        })),
    ))
}

pub async fn update_siswa(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateSiswaRequest>,
) -> AppResult<Json<Value>> {
    // Validasi input
    if let Some(status) = payload.status.as_deref() {
        if !is_valid_status(status) {
            return Err(AppError::InvalidInput(
                "Status siswa harus 'aktif' atau 'nonaktif'.".into(),
            ));
        }
    }
    if let Some(email) = payload.email.as_deref() {
        if !email.contains('@') {
            return Err(AppError::InvalidInput("Format email tidak valid.".into()));
        }
    }
    if let Some(fullname) = payload.fullname.as_deref() {
        if fullname.trim().is_empty() {
            return Err(AppError::InvalidInput("Nama lengkap tidak boleh kosong.".into()));
        }
    }

    let updated_siswa = sqlx::query_as::<_, Siswa>(
        r#"UPDATE siswa SET
           fullname = COALESCE($2, fullname),
           address = COALESCE($3, address),
           phonenumber = COALESCE($4, phonenumber),
           email = COALESCE($5, email),
           status = COALESCE($6, status),
           updated_at = $7
           WHERE id = $1 RETURNING *"#,
    )
    .bind(id)
    .bind(payload.fullname.as_deref().map(str::trim))
    .bind(payload.address.as_deref().map(str::trim))
    .bind(payload.phonenumber.as_deref().map(str::trim))
    .bind(payload.email.as_deref().map(str::trim))
    .bind(payload.status.as_deref())
    .bind(Utc::now())
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(siswa_not_found)?;

    Ok(Json(json!({
        "status": "success",
        "message": "Data siswa berhasil diperbarui!",
        "data": updated_siswa
    })))
}

pub async fn delete_siswa(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query("DELETE FROM siswa WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(siswa_not_found());
    }

    Ok(Json(json!({
        "status": "success",
        "message": "Siswa berhasil dihapus!"
    })))
}
