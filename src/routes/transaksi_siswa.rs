use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{AppError, AppJson, AppPath, AppResult};
use crate::models::siswa::Siswa;
use crate::models::transaksi_siswa::{CreateTransaksiSiswaRequest, TransaksiSiswa, STATUS_UNPAID};
use crate::services::enrollment;
use crate::state::AppState;

fn transaksi_not_found() -> AppError {
    AppError::NotFound("Transaksi siswa tidak ditemukan.".into())
}

pub async fn get_all_transaksi(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Value>> {
    let transaksi =
        sqlx::query_as::<_, TransaksiSiswa>("SELECT * FROM transaksi_siswa ORDER BY tanggal DESC")
            .fetch_all(&state.db)
            .await?;

    Ok(Json(json!({
        "status": "success",
        "data": transaksi
    })))
}

pub async fn get_transaksi_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Value>> {
    let transaksi =
        sqlx::query_as::<_, TransaksiSiswa>("SELECT * FROM transaksi_siswa WHERE id = $1")
            .bind(id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(transaksi_not_found)?;

    Ok(Json(json!({
        "status": "success",
        "data": transaksi
    })))
}

/// Records a purchase by the calling user; it starts `unpaid`.
pub async fn create_transaksi(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(payload): AppJson<CreateTransaksiSiswaRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    // Validasi input
    if payload.item.trim().is_empty() || !payload.harga.is_finite() || payload.harga <= 0.0 {
        return Err(AppError::InvalidInput(
            "Item dan harga harus diisi dengan benar.".into(),
        ));
    }

    // Cek apakah siswa exists
    let siswa = sqlx::query_as::<_, Siswa>("SELECT * FROM siswa WHERE id = $1")
        .bind(payload.siswa_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Siswa tidak ditemukan.".into()))?;

    let new_transaksi = sqlx::query_as::<_, TransaksiSiswa>(
        r#"INSERT INTO transaksi_siswa (id, siswa_id, user_id, item, harga, tanggal, status)
           VALUES ($1, $2, $3, $4, $5, $6, $7)
           RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(siswa.id)
    .bind(user.id)
    .bind(payload.item.trim())
    .bind(payload.harga)
    .bind(Utc::now())
    .bind(STATUS_UNPAID)
    .fetch_one(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Transaksi berhasil dibuat!",
            "data": new_transaksi
        })),
    ))
}

/// Marks the purchase paid and activates its student in one transaction.
pub async fn bayar_transaksi(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Value>> {
    let paid = enrollment::bayar_transaksi(&state.store(), id, Utc::now()).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Transaksi dibayar dan status siswa diperbarui!",
        "data": paid
    })))
}

pub async fn delete_transaksi(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query("DELETE FROM transaksi_siswa WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(transaksi_not_found());
    }

    Ok(Json(json!({
        "status": "success",
        "message": "Transaksi berhasil dihapus!"
    })))
}
