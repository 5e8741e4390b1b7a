use axum::{extract::State, response::Json};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{AppError, AppJson, AppPath, AppResult};
use crate::models::schedule::{AddScheduleRequest, Schedule, UpdateScheduleRequest};
use crate::services::enrollment::{self, validate_slots};
use crate::state::AppState;

fn schedule_not_found() -> AppError {
    AppError::NotFound("Jadwal tidak ditemukan.".into())
}

pub async fn get_all_schedules(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Value>> {
    let schedules = sqlx::query_as::<_, Schedule>("SELECT * FROM course_schedules ORDER BY name ASC")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(json!({
        "status": "success",
        "data": schedules
    })))
}

/// Creates the course's schedule, or appends the dates when one exists.
pub async fn add_schedule(
    State(state): State<AppState>,
    _user: AuthUser,
    AppJson(payload): AppJson<AddScheduleRequest>,
) -> AppResult<Json<Value>> {
    let schedule = enrollment::add_schedule(&state.store(), payload, Utc::now()).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Jadwal course berhasil ditambahkan!",
        "data": schedule
    })))
}

pub async fn get_schedule(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(course_id): AppPath<Uuid>,
) -> AppResult<Json<Value>> {
    let schedule =
        sqlx::query_as::<_, Schedule>("SELECT * FROM course_schedules WHERE course_id = $1")
            .bind(course_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(schedule_not_found)?;

    Ok(Json(json!({
        "status": "success",
        "data": schedule
    })))
}

/// Replaces time slots and dates wholesale.
pub async fn update_schedule(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(course_id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateScheduleRequest>,
) -> AppResult<Json<Value>> {
    let (time, dates) = validate_slots(&payload.time, &payload.dates)?;

    let schedule = sqlx::query_as::<_, Schedule>(
        r#"UPDATE course_schedules SET time_slots = $2, dates = $3, updated_at = $4
           WHERE course_id = $1 RETURNING *"#,
    )
    .bind(course_id)
    .bind(&time)
    .bind(&dates)
    .bind(Utc::now())
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(schedule_not_found)?;

    Ok(Json(json!({
        "status": "success",
        "message": "Jadwal berhasil diperbarui!",
        "data": schedule
    })))
}

pub async fn delete_schedule(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(course_id): AppPath<Uuid>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query("DELETE FROM course_schedules WHERE course_id = $1")
        .bind(course_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(schedule_not_found());
    }

    Ok(Json(json!({
        "status": "success",
        "message": "Jadwal berhasil dihapus!"
    })))
}
