use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Schedule {
    pub course_id: Uuid,
    pub name: String,
    #[serde(rename = "time")]
    pub time_slots: Vec<String>,
    pub dates: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct AddScheduleRequest {
    pub course_id: Uuid,
    pub time: Vec<String>,
    pub dates: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateScheduleRequest {
    pub time: Vec<String>,
    pub dates: Vec<String>,
}
