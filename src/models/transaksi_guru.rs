use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::timezone;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TransaksiGuru {
    pub id: Uuid,
    pub guru_id: Uuid,
    pub guru_name: String,
    pub amount: f64,
    /// First day of the WIB month this payout belongs to.
    pub periode: NaiveDate,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payout as returned over HTTP, with the WIB display timestamp.
#[derive(Debug, Serialize)]
pub struct TransaksiGuruResponse {
    #[serde(flatten)]
    pub transaksi: TransaksiGuru,
    pub created_at_wib: String,
}

impl From<TransaksiGuru> for TransaksiGuruResponse {
    fn from(transaksi: TransaksiGuru) -> Self {
        let created_at_wib = timezone::format_wib(transaksi.created_at);
        TransaksiGuruResponse {
            transaksi,
            created_at_wib,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTransaksiGuruRequest {
    pub guru_id: Uuid,
    pub amount: f64,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTransaksiGuruRequest {
    pub amount: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LaporanGuruQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub month: Option<String>, // YYYY-MM
}
