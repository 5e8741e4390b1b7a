use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagihanStatus {
    #[serde(rename = "Belum Bayar")]
    BelumBayar,
    #[serde(rename = "Lunas")]
    Lunas,
}

impl TagihanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagihanStatus::BelumBayar => "Belum Bayar",
            TagihanStatus::Lunas => "Lunas",
        }
    }
}

impl FromStr for TagihanStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "Belum Bayar" => Ok(TagihanStatus::BelumBayar),
            "Lunas" => Ok(TagihanStatus::Lunas),
            other => Err(format!(
                "Status tagihan tidak dikenal: {other}. Gunakan \"Belum Bayar\" atau \"Lunas\"."
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Tagihan {
    pub id: Uuid,
    pub siswa_id: Uuid,
    pub siswa_name: String,
    pub siswa_email: String,
    pub course_id: Uuid,
    pub course_name: String,
    pub amount: f64,
    pub due_date: DateTime<Utc>,
    pub paid: bool,
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTagihanRequest {
    pub siswa_id: Uuid,
    pub course_id: Uuid,
    pub due_date: Option<String>, // RFC 3339 atau YYYY-MM-DD
}

/// Partial update. `amount`, `status` and `paid` may only repeat the stored
/// values; settlement goes through `PUT /tagihan/:id/bayar`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTagihanRequest {
    pub due_date: Option<String>,
    pub siswa_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    pub amount: Option<f64>,
    pub status: Option<String>,
    pub paid: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LaporanTagihanQuery {
    pub status: Option<String>, // dipisah koma, mis. "Lunas,Belum Bayar"
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TagihanFilter {
    pub statuses: Vec<TagihanStatus>,
    pub created_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl TagihanFilter {
    pub fn status_strings(&self) -> Vec<String> {
        self.statuses.iter().map(|s| s.as_str().to_string()).collect()
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct RingkasanTagihan {
    pub jumlah_tagihan: usize,
    pub total_tagihan: f64,
    pub total_lunas: f64,
    pub total_belum_bayar: f64,
}

impl RingkasanTagihan {
    pub fn from_tagihan(list: &[Tagihan]) -> Self {
        let (lunas, belum): (Vec<&Tagihan>, Vec<&Tagihan>) = list.iter().partition(|t| t.paid);
        RingkasanTagihan {
            jumlah_tagihan: list.len(),
            total_tagihan: list.iter().map(|t| t.amount).sum(),
            total_lunas: lunas.iter().map(|t| t.amount).sum(),
            total_belum_bayar: belum.iter().map(|t| t.amount).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_text() {
        assert_eq!("Lunas".parse::<TagihanStatus>(), Ok(TagihanStatus::Lunas));
        assert_eq!(" Belum Bayar ".parse::<TagihanStatus>(), Ok(TagihanStatus::BelumBayar));
        assert!("lunas".parse::<TagihanStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&TagihanStatus::BelumBayar).unwrap(),
            "\"Belum Bayar\""
        );
    }
}
