//! DTOs module - Data Transfer Objects
//!
//! Questo modulo contiene tutti i DTOs usati per la comunicazione client-server.
//! I DTOs separano la rappresentazione esterna (API) dalla rappresentazione interna (entities).

pub mod auth;
pub mod course;
pub mod feedback;
pub mod organization;
pub mod query;
pub mod setting;
pub mod stats;
pub mod user;

pub use auth::LoginDTO;
pub use course::{CourseDTO, CourseDetailDTO};
pub use feedback::{FeedbackDTO, FeedbackSummaryDTO};
pub use organization::{
    CreateOrganizationDTO, InvitationCodePath, OrganizationDetailDTO, OrganizationSummaryDTO,
    UpdateOrganizationDTO,
};
pub use query::{
    CourseQuery, FeedbackQuery, OrganizationSearchQuery, OverviewQuery, Page, PageRequest,
    UserSearchQuery,
};
pub use setting::{SettingKeyPath, UpdateSettingDTO};
pub use stats::{ChartDTO, ExamStatsDTO, OrganizationUsageDTO, OverviewDTO, TotalsDTO};
pub use user::{CreateUserDTO, UpdateUserDTO, UserDTO, UserDetailDTO, UserSummaryDTO};

use serde::{Deserialize, Deserializer};

/// Distingue un campo assente (`None`) da un campo esplicitamente `null` (`Some(None)`)
/// nelle PATCH, da usare con `#[serde(default, deserialize_with = "double_option")]`
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
