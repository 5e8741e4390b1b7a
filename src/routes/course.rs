use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::database::Database;
use crate::error::{AppError, AppJson, AppPath, AppResult};
use crate::models::course::{course_code, Course, CreateCourseRequest, UpdateCourseRequest};
use crate::state::AppState;

fn course_not_found() -> AppError {
    AppError::NotFound("Course tidak ditemukan.".into())
}

fn validate_cost_and_duration(cost: f64, duration: i32) -> AppResult<()> {
    if !cost.is_finite() || cost < 0.0 {
        return Err(AppError::InvalidInput("Biaya course tidak boleh negatif.".into()));
    }
    if duration < 0 {
        return Err(AppError::InvalidInput("Durasi course tidak boleh negatif.".into()));
    }
    Ok(())
}

/// Highest `C-nnnn` number in use plus one, so deleted courses never hand
/// their code out again.
async fn next_code(db: &Database) -> AppResult<String> {
    let last: i64 = sqlx::query_scalar(
        r#"SELECT COALESCE(MAX(CAST(SUBSTRING(code FROM 3) AS BIGINT)), 0)
           FROM courses WHERE code ~ '^C-[0-9]+$'"#,
    )
    .fetch_one(db)
    .await?;

    Ok(course_code(last + 1))
}

pub async fn get_all_courses(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Value>> {
    let courses = sqlx::query_as::<_, Course>("SELECT * FROM courses ORDER BY code ASC")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(json!({
        "status": "success",
        "data": courses
    })))
}

pub async fn next_course_id(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Value>> {
    let next_id = next_code(&state.db).await?;

    Ok(Json(json!({
        "status": "success",
        "data": { "next_id": next_id }
    })))
}

pub async fn get_course_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Value>> {
    let course = sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(course_not_found)?;

    Ok(Json(json!({
        "status": "success",
        "data": course
    })))
}

pub async fn create_course(
    State(state): State<AppState>,
    _user: AuthUser,
    AppJson(payload): AppJson<CreateCourseRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    // Validasi input
    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidInput("Nama course wajib diisi.".into()));
    }
    validate_cost_and_duration(payload.cost, payload.duration)?;

    let code = next_code(&state.db).await?;

    let new_course = sqlx::query_as::<_, Course>(
        r#"INSERT INTO courses (id, code, name, duration, cost, description)
           VALUES ($1, $2, $3, $4, $5, $6)
           RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(&code)
    .bind(payload.name.trim())
    .bind(payload.duration)
    .bind(payload.cost)
    .bind(payload.description.trim())
    .fetch_one(&state.db)
    .await
    .map_err(|err| {
        AppError::from_unique_violation(err, "courses_code_key", "Kode course bentrok, silakan coba lagi.")
    })?;

    tracing::info!(course_id = %new_course.id, code = %new_course.code, "Course created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Course berhasil dibuat!",
            "data": new_course
        })),
    ))
}

/// Cost changes only affect invoices created afterwards.
pub async fn update_course(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateCourseRequest>,
) -> AppResult<Json<Value>> {
    // Cek apakah course exists
    let existing = sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(course_not_found)?;

    // Validasi input
    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return Err(AppError::InvalidInput("Nama course tidak boleh kosong.".into()));
        }
    }
    validate_cost_and_duration(
        payload.cost.unwrap_or(existing.cost),
        payload.duration.unwrap_or(existing.duration),
    )?;

    let updated_course = sqlx::query_as::<_, Course>(
        r#"UPDATE courses SET
           name = COALESCE($2, name),
           duration = COALESCE($3, duration),
           cost = COALESCE($4, cost),
           description = COALESCE($5, description),
           updated_at = $6
           WHERE id = $1 RETURNING *"#,
    )
    .bind(id)
    .bind(payload.name.as_deref().map(str::trim))
    .bind(payload.duration)
    .bind(payload.cost)
    .bind(payload.description.as_deref().map(str::trim))
    .bind(Utc::now())
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(course_not_found)?;

    Ok(Json(json!({
        "status": "success",
        "message": "Course berhasil diperbarui!",
        "data": updated_course
    })))
}

pub async fn delete_course(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query("DELETE FROM courses WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(course_not_found());
    }

    Ok(Json(json!({
        "status": "success",
        "message": "Course berhasil dihapus!"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_cost_and_duration() {
        assert!(validate_cost_and_duration(-1.0, 10).is_err());
        assert!(validate_cost_and_duration(f64::NAN, 10).is_err());
        assert!(validate_cost_and_duration(100.0, -2).is_err());
        assert!(validate_cost_and_duration(0.0, 0).is_ok());
    }
}
