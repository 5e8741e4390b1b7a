use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{AppJson, AppPath, AppQuery, AppResult};
use crate::models::transaksi_guru::{
    CreateTransaksiGuruRequest, LaporanGuruQuery, TransaksiGuru, TransaksiGuruResponse,
    UpdateTransaksiGuruRequest,
};
use crate::services::payout;
use crate::state::AppState;

fn to_responses(rows: Vec<TransaksiGuru>) -> Vec<TransaksiGuruResponse> {
    rows.into_iter().map(TransaksiGuruResponse::from).collect()
}

pub async fn get_all_transaksi_guru(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Value>> {
    let rows = payout::list_payouts(&state.store()).await?;

    Ok(Json(json!({
        "status": "success",
        "data": to_responses(rows)
    })))
}

pub async fn get_transaksi_guru_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Value>> {
    let transaksi = payout::get_payout(&state.store(), id).await?;

    Ok(Json(json!({
        "status": "success",
        "data": TransaksiGuruResponse::from(transaksi)
    })))
}

pub async fn create_transaksi_guru(
    State(state): State<AppState>,
    _user: AuthUser,
    AppJson(payload): AppJson<CreateTransaksiGuruRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let transaksi = payout::create_payout(&state.store(), payload, Utc::now()).await?;
    tracing::info!(transaksi_id = %transaksi.id, guru_id = %transaksi.guru_id, periode = %transaksi.periode, "Transaksi guru created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Transaksi guru berhasil dibuat!",
            "data": TransaksiGuruResponse::from(transaksi)
        })),
    ))
}

pub async fn update_transaksi_guru(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateTransaksiGuruRequest>,
) -> AppResult<Json<Value>> {
    let transaksi = payout::update_payout(&state.store(), id, payload, Utc::now()).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Transaksi guru berhasil diperbarui!",
        "data": TransaksiGuruResponse::from(transaksi)
    })))
}

pub async fn delete_transaksi_guru(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Value>> {
    payout::delete_payout(&state.store(), id).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Transaksi guru berhasil dihapus!"
    })))
}

/// `?month=YYYY-MM` or `?start_date=&end_date=` (inclusive WIB days).
pub async fn laporan_guru(
    State(state): State<AppState>,
    _user: AuthUser,
    AppQuery(query): AppQuery<LaporanGuruQuery>,
) -> AppResult<Json<Value>> {
    let (rows, total) = payout::laporan_payout(&state.store(), &query).await?;

    Ok(Json(json!({
        "status": "success",
        "data": {
            "jumlah_transaksi": rows.len(),
            "total_pembayaran": total,
            "transaksi": to_responses(rows)
        }
    })))
}
