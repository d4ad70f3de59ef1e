//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Questo modulo organizza i service handlers in sotto-moduli separati per una migliore manutenibilità.
//! Ogni modulo gestisce gli endpoint HTTP per una specifica sezione della dashboard;
//! `membership` raccoglie le regole su manager e ruoli usate da organizzazioni e utenti.

pub mod auth;
pub mod course;
pub mod feedback;
pub mod membership;
pub mod organization;
pub mod setting;
pub mod stats;
pub mod user;

// Re-exports per facilitare l'import
pub use auth::{current_user, login_user, logout_user};
pub use course::{exam_stats, get_course, list_courses};
pub use feedback::{delete_feedback, feedback_summary, list_feedbacks};
pub use organization::{
    create_organization, delete_organization, get_organization, get_organization_by_code,
    list_organizations, regenerate_invitation_code, update_organization,
};
pub use setting::{list_settings, update_setting};
pub use stats::{organization_usage, overview};
pub use user::{create_user, delete_user, get_user, list_users, update_user};

use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

/// Root endpoint - health check
pub async fn root(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, "AmbaLearn dashboard is running!")
}
