use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{AppError, AppJson, AppPath, AppQuery, AppResult};
use crate::models::guru::{CreateGuruRequest, Guru, GuruQuery, UpdateGuruRequest};
use crate::models::siswa::{is_valid_status, STATUS_AKTIF};
use crate::state::AppState;

fn guru_not_found() -> AppError {
    AppError::NotFound("Guru tidak ditemukan.".into())
}

/// Trimmed status, `None` when absent or blank.
fn check_status(raw: Option<&str>) -> AppResult<Option<&str>> {
    match raw.map(str::trim).filter(|status| !status.is_empty()) {
        Some(status) if !is_valid_status(status) => Err(AppError::InvalidInput(
            "Status guru harus 'aktif' atau 'nonaktif'.".into(),
        )),
        status => Ok(status),
    }
}

/// All teachers, or only those with `?status=`.
pub async fn get_all_gurus(
    State(state): State<AppState>,
    _user: AuthUser,
    AppQuery(query): AppQuery<GuruQuery>,
) -> AppResult<Json<Value>> {
    let status = check_status(query.status.as_deref())?;

    let gurus = match status {
        Some(status) => {
            sqlx::query_as::<_, Guru>("SELECT * FROM gurus WHERE status = $1 ORDER BY joined_at DESC")
                .bind(status)
                .fetch_all(&state.db)
                .await?
        }
        None => {
            sqlx::query_as::<_, Guru>("SELECT * FROM gurus ORDER BY joined_at DESC")
                .fetch_all(&state.db)
                .await?
        }
    };

    Ok(Json(json!({
        "status": "success",
        "data": gurus
    })))
}

pub async fn get_guru_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Value>> {
    let guru = sqlx::query_as::<_, Guru>("SELECT * FROM gurus WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(guru_not_found)?;

    Ok(Json(json!({
        "status": "success",
        "data": guru
    })))
}

pub async fn create_guru(
    State(state): State<AppState>,
    _user: AuthUser,
    AppJson(payload): AppJson<CreateGuruRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    // Validasi input
    if payload.fullname.trim().is_empty() || payload.school_subject.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Nama lengkap dan mata pelajaran guru wajib diisi.".into(),
        ));
    }
    let status = check_status(payload.status.as_deref())?;

    let new_guru = sqlx::query_as::<_, Guru>(
        r#"INSERT INTO gurus (id, fullname, address, phonenumber, email, school_subject, status)
           VALUES ($1, $2, $3, $4, $5, $6, $7)
           RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.fullname.trim())
    .bind(payload.address.trim())
    .bind(payload.phonenumber.trim())
    .bind(payload.email.trim())
    .bind(payload.school_subject.trim())
    .bind(status.unwrap_or(STATUS_AKTIF))
    .fetch_one(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Guru berhasil ditambahkan!",
            "data": new_guru
        })),
    ))
}

pub async fn update_guru(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateGuruRequest>,
) -> AppResult<Json<Value>> {
    let status = check_status(payload.status.as_deref())?;

    let updated_guru = sqlx::query_as::<_, Guru>(
        r#"UPDATE gurus SET
           fullname = COALESCE($2, fullname),
           address = COALESCE($3, address),
           phonenumber = COALESCE($4, phonenumber),
           email = COALESCE($5, email),
           school_subject = COALESCE($6, school_subject),
           status = COALESCE($7, status),
           updated_at = $8
           WHERE id = $1 RETURNING *"#,
    )
    .bind(id)
    .bind(payload.fullname.as_deref().map(str::trim))
    .bind(payload.address.as_deref().map(str::trim))
    .bind(payload.phonenumber.as_deref().map(str::trim))
    .bind(payload.email.as_deref().map(str::trim))
    .bind(payload.school_subject.as_deref().map(str::trim))
    .bind(status)
    .bind(Utc::now())
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(guru_not_found)?;

    Ok(Json(json!({
        "status": "success",
        "message": "Data guru berhasil diperbarui!",
        "data": updated_guru
    })))
}

pub async fn delete_guru(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query("DELETE FROM gurus WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(guru_not_found());
    }

    Ok(Json(json!({
        "status": "success",
        "message": "Guru berhasil dihapus!"
    })))
}

#[cfg(test)]
mod tests {
    use super::check_status;

    #[test]
    fn status_filter_accepts_known_values_only() {
        assert_eq!(check_status(None).unwrap(), None);
        assert_eq!(check_status(Some("aktif")).unwrap(), Some("aktif"));
        assert_eq!(check_status(Some("nonaktif")).unwrap(), Some("nonaktif"));
        assert!(check_status(Some("cuti")).is_err());
    }

    #[test]
    fn status_is_trimmed_the_same_for_reads_and_writes() {
        assert_eq!(check_status(Some(" aktif")).unwrap(), Some("aktif"));
        assert_eq!(check_status(Some("nonaktif \n")).unwrap(), Some("nonaktif"));
        assert_eq!(check_status(Some("   ")).unwrap(), None);
        assert!(check_status(Some(" cuti ")).is_err());
    }
}
