//! AmbaLearn dashboard library - espone i moduli principali per i test

pub mod analytics;
pub mod core;
pub mod dtos;
pub mod entities;
pub mod repositories;
pub mod seed;
pub mod services;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppError, AppState, auth, config};
pub use services::root;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use std::sync::Arc;

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    use services::*;

    Router::new()
        .route("/", get(root))
        .nest("/auth", configure_auth_routes(state.clone()))
        .nest("/organizations", admin_only(configure_organization_routes(), state.clone()))
        .nest("/users", admin_only(configure_user_routes(), state.clone()))
        .nest("/feedbacks", admin_only(configure_feedback_routes(), state.clone()))
        .nest("/courses", admin_only(configure_course_routes(), state.clone()))
        .nest(
            "/exams",
            admin_only(Router::new().route("/stats", get(exam_stats)), state.clone()),
        )
        .nest("/stats", admin_only(configure_stats_routes(), state.clone()))
        .nest("/settings", admin_only(configure_setting_routes(), state.clone()))
        .with_state(state)
}

/// Applica autenticazione e controllo del ruolo admin.
/// L'ultimo layer aggiunto è il primo ad essere eseguito: prima il token, poi il ruolo.
fn admin_only(router: Router<Arc<AppState>>, state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::{admin_only_middleware, authentication_middleware};

    router
        .layer(middleware::from_fn(admin_only_middleware))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes di autenticazione (login, logout, me)
fn configure_auth_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use services::*;

    let public_routes = Router::new()
        .route("/login", post(login_user))
        .route("/logout", post(logout_user));

    let session_routes = admin_only(Router::new().route("/me", get(current_user)), state);

    public_routes.merge(session_routes)
}

/// Configura le routes per la gestione delle organizzazioni
fn configure_organization_routes() -> Router<Arc<AppState>> {
    use services::*;

    Router::new()
        .route("/", get(list_organizations).post(create_organization))
        .route("/code/{code}", get(get_organization_by_code))
        .route(
            "/{organization_id}",
            get(get_organization)
                .patch(update_organization)
                .delete(delete_organization),
        )
        .route(
            "/{organization_id}/invitation-code",
            post(regenerate_invitation_code),
        )
}

/// Configura le routes per la gestione degli utenti
fn configure_user_routes() -> Router<Arc<AppState>> {
    use services::*;

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{user_id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

fn configure_feedback_routes() -> Router<Arc<AppState>> {
    use services::*;

    Router::new()
        .route("/", get(list_feedbacks))
        .route("/summary", get(feedback_summary))
        .route("/{feedback_id}", axum::routing::delete(delete_feedback))
}

fn configure_course_routes() -> Router<Arc<AppState>> {
    use services::*;

    Router::new()
        .route("/", get(list_courses))
        .route("/{uid}", get(get_course))
}

fn configure_stats_routes() -> Router<Arc<AppState>> {
    use services::*;

    Router::new()
        .route("/overview", get(overview))
        .route("/organizations", get(organization_usage))
}

fn configure_setting_routes() -> Router<Arc<AppState>> {
    use services::*;

    Router::new()
        .route("/", get(list_settings))
        .route("/{key}", put(update_setting))
}
