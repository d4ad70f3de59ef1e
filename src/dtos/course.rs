//! Course DTOs - Solo metadati, il contenuto dei corsi è gestito dall'Engine

use super::feedback::FeedbackDTO;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct CourseDTO {
    pub uid: String,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: Option<String>,
    pub owner_username: Option<String>,
    pub organization_id: Option<String>,
    pub organization_name: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub feedback_count: i64,
}

#[derive(Serialize, Debug)]
pub struct CourseDetailDTO {
    pub course: CourseDTO,
    pub feedbacks: Vec<FeedbackDTO>,
}
