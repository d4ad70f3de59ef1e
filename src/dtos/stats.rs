//! Stats DTOs - Card e grafici della pagina overview

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TotalsDTO {
    pub organizations: i64,
    pub users: i64,
    pub courses: i64,
    pub feedbacks: i64,
    pub prompts: i64,
    pub exam_scores: i64,
}

/// Serie giornaliere allineate: l'i-esimo valore di ogni serie si riferisce a `dates[i]`
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ChartDTO {
    /// Etichette `MM-DD`
    pub labels: Vec<String>,
    /// Date `YYYY-MM-DD`
    pub dates: Vec<String>,
    pub prompt_counts: Vec<i64>,
    pub new_user_counts: Vec<i64>,
    pub active_user_counts: Vec<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OverviewDTO {
    pub totals: TotalsDTO,
    pub chart: ChartDTO,
}

/// Aggregato per esame
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExamStatsDTO {
    pub exam_id: String,
    pub exam_title: String,
    pub attempts: i64,
    pub average_score: f64,
    pub best_score: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct OrganizationUsageDTO {
    pub organization_id: String,
    pub name: String,
    pub member_count: i64,
    pub course_count: i64,
}
