use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const STATUS_AKTIF: &str = "aktif";
pub const STATUS_NONAKTIF: &str = "nonaktif";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Siswa {
    pub id: Uuid,
    pub fullname: String,
    pub address: String,
    pub phonenumber: String,
    pub email: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSiswaRequest {
    pub fullname: String,
    pub address: String,
    pub phonenumber: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSiswaRequest {
    pub fullname: Option<String>,
    pub address: Option<String>,
    pub phonenumber: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
}

pub fn is_valid_status(status: &str) -> bool {
    status == STATUS_AKTIF || status == STATUS_NONAKTIF
}
