use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const STATUS_UNPAID: &str = "unpaid";
pub const STATUS_PAID: &str = "paid";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransaksiSiswa {
    pub id: Uuid,
    pub siswa_id: Uuid,
    pub user_id: Uuid,
    pub item: String,
    pub harga: f64,
    pub tanggal: DateTime<Utc>,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTransaksiSiswaRequest {
    pub siswa_id: Uuid,
    pub item: String,
    pub harga: f64,
}
