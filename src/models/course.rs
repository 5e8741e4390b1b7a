use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub duration: i32,
    pub cost: f64,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub name: String,
    #[serde(default)]
    pub duration: i32,
    pub cost: f64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCourseRequest {
    pub name: Option<String>,
    pub duration: Option<i32>,
    pub cost: Option<f64>,
    pub description: Option<String>,
}

/// Course codes run `C-0001`, `C-0002`, ...
pub fn course_code(sequence: i64) -> String {
    format!("C-{:04}", sequence)
}
