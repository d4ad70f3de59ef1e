//! Organization entity - Entità organizzazione e codici di invito

use chrono::NaiveDateTime;
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};

/// Lunghezza del codice di invito (colonna VARCHAR(6) UNIQUE)
pub const INVITATION_CODE_LEN: usize = 6;

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<String>,
    pub registered_at: NaiveDateTime,
    pub invitation_code: String,
}

impl Organization {
    pub fn new_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Genera un codice di invito casuale: 6 caratteri alfanumerici maiuscoli.
    /// L'unicità va verificata sul database dal chiamante.
    pub fn generate_invitation_code() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(INVITATION_CODE_LEN)
            .map(|b| (b as char).to_ascii_uppercase())
            .collect()
    }

    pub fn is_valid_invitation_code(code: &str) -> bool {
        code.len() == INVITATION_CODE_LEN
            && code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    }

    pub fn is_managed_by(&self, user_id: &str) -> bool {
        self.manager_id.as_deref() == Some(user_id)
    }
}
