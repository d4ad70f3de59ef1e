//! User DTOs - Data Transfer Objects per utenti

use super::double_option;
use crate::entities::{CourseMetadata, ExamScore, Feedback, Organization, User, UserRole};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

// struct per gestire io col client, senza password_hash
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserDTO {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub organization_id: Option<String>,
    pub picture: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub registered_at: NaiveDateTime,
    pub last_login: Option<NaiveDateTime>,
}

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            username: value.username,
            email: value.email,
            role: value.role,
            organization_id: value.organization_id,
            picture: value.picture,
            birthday: value.birthday,
            registered_at: value.registered_at,
            last_login: value.last_login,
        }
    }
}

/// Riga della lista utenti, già unita al nome dell'organizzazione
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct UserSummaryDTO {
    pub id: String,
    pub username: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    pub organization_id: Option<String>,
    pub organization_name: Option<String>,
    pub registered_at: NaiveDateTime,
    pub last_login: Option<NaiveDateTime>,
}

/// Scheda completa di un utente
#[derive(Serialize, Debug)]
pub struct UserDetailDTO {
    pub user: UserDTO,
    pub organization: Option<Organization>,
    pub managed_organizations: Vec<Organization>,
    pub feedbacks: Vec<Feedback>,
    pub exam_scores: Vec<ExamScore>,
    pub courses: Vec<CourseMetadata>,
}

/// DTO per creare un nuovo utente dal pannello admin
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateUserDTO {
    #[validate(length(min = 3, max = 80, message = "Username must be between 3 and 80 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email address"), length(max = 120))]
    pub email: String,
    // bcrypt considera solo i primi 72 byte
    #[validate(length(min = 8, max = 72, message = "Password must be between 8 and 72 characters"))]
    pub password: String,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub organization_id: Option<String>,
}

/// DTO per aggiornare un utente: i campi assenti restano invariati,
/// `organization_id: null` rimuove l'utente dall'organizzazione
#[derive(Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateUserDTO {
    #[validate(length(min = 3, max = 80, message = "Username must be between 3 and 80 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "Invalid email address"), length(max = 120))]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 72, message = "Password must be between 8 and 72 characters"))]
    pub password: Option<String>,
    pub role: Option<UserRole>,
    #[serde(default, deserialize_with = "double_option")]
    pub organization_id: Option<Option<String>>,
}
