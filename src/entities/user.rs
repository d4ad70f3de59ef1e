//! User entity - Entità utente con metodi per gestione password

use super::enums::UserRole;
use bcrypt::{DEFAULT_COST, hash};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    // l'hash non deve mai uscire verso il client
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub picture: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub registered_at: NaiveDateTime,
    pub last_login: Option<NaiveDateTime>,
    pub organization_id: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: UserRole,
}

impl User {
    /// Hash a password using bcrypt with default cost
    pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
        let hash = hash(password, DEFAULT_COST)?;
        Ok(hash)
    }

    /// Nuovo id nel formato usato dall'Engine (uuid v4 testuale)
    pub fn new_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }
}
