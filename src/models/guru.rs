use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Guru {
    pub id: Uuid,
    pub fullname: String,
    pub address: String,
    pub phonenumber: String,
    pub email: String,
    pub school_subject: String,
    pub status: String,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateGuruRequest {
    pub fullname: String,
    pub address: String,
    pub phonenumber: String,
    pub email: String,
    pub school_subject: String,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGuruRequest {
    pub fullname: Option<String>,
    pub address: Option<String>,
    pub phonenumber: Option<String>,
    pub email: Option<String>,
    pub school_subject: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GuruQuery {
    pub status: Option<String>,
}
