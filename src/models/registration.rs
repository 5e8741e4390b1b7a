use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: Uuid,
    pub course_id: Uuid,
    pub student_name: String,
    pub email: String,
    pub phonenumber: String,
    pub status: String,
    pub courses: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRegistrationRequest {
    pub course_id: Uuid,
    pub student_name: String,
    pub email: String,
    pub phonenumber: String,
    pub status: String,
    pub courses: Vec<String>,
}
