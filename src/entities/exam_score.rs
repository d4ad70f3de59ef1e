//! ExamScore entity - Punteggio di un utente in un esame

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct ExamScore {
    pub id: i32,
    pub user_id: String,
    pub exam_id: String,
    pub exam_title: String,
    pub score: i32,
    pub exam_date: NaiveDateTime,
}
