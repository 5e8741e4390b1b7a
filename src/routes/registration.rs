use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{AppError, AppJson, AppResult};
use crate::models::registration::{CreateRegistrationRequest, Registration};
use crate::state::AppState;

pub async fn create_registration(
    State(state): State<AppState>,
    _user: AuthUser,
    AppJson(payload): AppJson<CreateRegistrationRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    // Validasi semua field wajib diisi
    if payload.student_name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.phonenumber.trim().is_empty()
        || payload.status.trim().is_empty()
        || payload.courses.is_empty()
    {
        return Err(AppError::InvalidInput(
            "Semua field pendaftaran wajib diisi.".into(),
        ));
    }

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1)")
        .bind(payload.course_id)
        .fetch_one(&state.db)
        .await?;
    if !exists {
        return Err(AppError::NotFound("Course tidak ditemukan.".into()));
    }

    let registration = sqlx::query_as::<_, Registration>(
        r#"INSERT INTO course_registrations
           (id, course_id, student_name, email, phonenumber, status, courses)
           VALUES ($1, $2, $3, $4, $5, $6, $7)
           RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.course_id)
    .bind(payload.student_name.trim())
    .bind(payload.email.trim())
    .bind(payload.phonenumber.trim())
    .bind(payload.status.trim())
    .bind(&payload.courses)
    .fetch_one(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Pendaftaran course berhasil!",
            "data": registration
        })),
    ))
}

pub async fn get_all_registrations(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Value>> {
    let registrations = sqlx::query_as::<_, Registration>(
        "SELECT * FROM course_registrations ORDER BY created_at DESC",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(json!({
        "status": "success",
        "data": registrations
    })))
}
