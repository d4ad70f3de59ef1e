//! Feedback entity - Commento di un utente su un corso

use super::enums::Sentiment;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Feedback {
    pub id: i32,
    pub user_id: String,
    pub comment: String,
    pub course_id: String,
    pub course_name: String,
    // scritto dall'Engine, qui solo in lettura
    #[sqlx(try_from = "String")]
    pub sentiment: Sentiment,
    pub created_at: NaiveDateTime,
}
