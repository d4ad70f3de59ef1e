//! Organization DTOs - Data Transfer Objects per organizzazioni

use super::double_option;
use super::user::{UserDTO, UserSummaryDTO};
use crate::entities::{CourseMetadata, Organization};
use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    /// Formato dei codici di invito: 6 caratteri maiuscoli o cifre
    pub static ref INVITATION_CODE_RE: Regex = Regex::new(r"^[A-Z0-9]{6}$").unwrap();
}

/// Riga della lista organizzazioni con nome del manager e numero di membri
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct OrganizationSummaryDTO {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<String>,
    pub manager_username: Option<String>,
    pub invitation_code: String,
    pub registered_at: NaiveDateTime,
    pub member_count: i64,
}

#[derive(Serialize, Debug)]
pub struct OrganizationDetailDTO {
    pub organization: Organization,
    pub manager: Option<UserDTO>,
    pub members: Vec<UserSummaryDTO>,
    pub courses: Vec<CourseMetadata>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateOrganizationDTO {
    #[validate(length(min = 1, max = 120, message = "Name must be between 1 and 120 characters"))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub manager_id: Option<String>,
}

/// `manager_id: null` rimuove il manager, un valore lo sostituisce, assente = invariato
#[derive(Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateOrganizationDTO {
    #[validate(length(min = 1, max = 120, message = "Name must be between 1 and 120 characters"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub manager_id: Option<Option<String>>,
}

/// Path param validato per la ricerca tramite codice di invito
#[derive(Deserialize, Debug, Validate)]
pub struct InvitationCodePath {
    #[validate(regex(path = *INVITATION_CODE_RE, message = "Invitation code must be 6 uppercase letters or digits"))]
    pub code: String,
}
