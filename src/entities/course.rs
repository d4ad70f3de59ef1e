//! CourseMetadata entity - Metadati dei corsi (il JSON del corso vive nell'Engine)

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct CourseMetadata {
    pub uid: String,
    pub title: String,
    pub description: Option<String>,
    /// Valorizzato per i corsi personali
    pub owner_id: Option<String>,
    /// Valorizzato per i corsi di organizzazione
    pub organization_id: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}
