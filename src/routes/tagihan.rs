use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{AppJson, AppPath, AppQuery, AppResult};
use crate::models::tagihan::{CreateTagihanRequest, LaporanTagihanQuery, UpdateTagihanRequest};
use crate::services::billing;
use crate::state::AppState;

pub async fn get_all_tagihan(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Value>> {
    let tagihan = billing::list_tagihan(&state.store()).await?;

    Ok(Json(json!({
        "status": "success",
        "data": tagihan
    })))
}

pub async fn get_tagihan_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Value>> {
    let tagihan = billing::get_tagihan(&state.store(), id).await?;

    Ok(Json(json!({
        "status": "success",
        "data": tagihan
    })))
}

pub async fn create_tagihan(
    State(state): State<AppState>,
    _user: AuthUser,
    AppJson(payload): AppJson<CreateTagihanRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let tagihan = billing::create_tagihan(&state.store(), payload, Utc::now()).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Tagihan berhasil dibuat!",
            "data": tagihan
        })),
    ))
}

pub async fn update_tagihan(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateTagihanRequest>,
) -> AppResult<Json<Value>> {
    let tagihan = billing::update_tagihan(&state.store(), id, payload, Utc::now()).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Tagihan berhasil diperbarui!",
        "data": tagihan
    })))
}

pub async fn bayar_tagihan(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Value>> {
    let tagihan = billing::bayar_tagihan(&state.store(), id, Utc::now()).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Tagihan berhasil dibayar!",
        "data": tagihan
    })))
}

pub async fn delete_tagihan(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Value>> {
    billing::delete_tagihan(&state.store(), id).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Tagihan berhasil dihapus!"
    })))
}

/// Invoices of the student records sharing the caller's email.
pub async fn get_tagihan_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Value>> {
    let tagihan = billing::tagihan_for_user(&state.store(), &user).await?;

    Ok(Json(json!({
        "status": "success",
        "data": tagihan
    })))
}

pub async fn laporan_tagihan(
    State(state): State<AppState>,
    _user: AuthUser,
    AppQuery(query): AppQuery<LaporanTagihanQuery>,
) -> AppResult<Json<Value>> {
    let (tagihan, ringkasan) = billing::laporan_tagihan(&state.store(), &query).await?;

    Ok(Json(json!({
        "status": "success",
        "data": {
            "ringkasan": ringkasan,
            "tagihan": tagihan
        }
    })))
}
