//! Auth services - Login delegato all'Engine e sessione della dashboard

use crate::core::auth::{expired_session_cookie, session_cookie};
use crate::core::{AppError, AppState, encode_jwt};
use crate::dtos::{LoginDTO, UserDTO};
use crate::entities::{User, UserRole};
use axum::{
    Extension,
    extract::{Json, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginDTO>, // JSON body
) -> Result<impl IntoResponse, AppError> {
    // 1. Validare email e password (fail-fast prima di chiamare l'Engine)
    // 2. Inoltrare le credenziali all'Engine, che decide se sono corrette
    // 3. Cercare l'utente per email nel database condiviso, se manca ritornare UNAUTHORIZED
    //    e, se l'Engine indica l'account autenticato, deve essere lo stesso
    // 4. Solo gli admin possono entrare nella dashboard, altrimenti FORBIDDEN
    // 5. Generare il token JWT e restituirlo come cookie HttpOnly e come header Authorization
    debug!("Processing dashboard login");
    body.validate()?;

    let engine_login = state.engine.login(&body.email, &body.password).await?;

    let user = state.user.find_by_email(&body.email).await?.ok_or_else(|| {
        warn!("Engine accepted credentials but user is missing from database");
        AppError::unauthorized("Invalid email or password")
    })?;

    if !engine_login.confirms(&user.id, &user.email) {
        warn!("Engine authenticated a different account than {}", user.id);
        return Err(AppError::bad_gateway("Authentication engine returned another account"));
    }

    if user.role != UserRole::Admin {
        warn!("Non-admin user {} tried to access the dashboard", user.id);
        return Err(AppError::forbidden("Access denied: administrators only"));
    }

    let token = encode_jwt(&user.id, &user.email, &state.jwt_secret, state.session_ttl_hours)?;
    let cookie = session_cookie(&token, state.session_ttl_hours, state.secure_cookies);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie)
            .map_err(|_| AppError::internal_server_error("Invalid session cookie"))?,
    );
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| AppError::internal_server_error("Invalid session token"))?,
    );

    info!("Admin {} logged in", user.id);
    Ok((StatusCode::OK, headers, Json(UserDTO::from(user))))
}

#[instrument]
pub async fn logout_user() -> impl IntoResponse {
    debug!("Clearing session cookie");
    (
        StatusCode::OK,
        [(header::SET_COOKIE, expired_session_cookie())],
        Json(serde_json::json!({ "message": "Logged out" })),
    )
}

#[instrument(skip(current_user), fields(user_id = %current_user.id))]
pub async fn current_user(
    Extension(current_user): Extension<User>, // ottenuto dall'autenticazione tramite token jwt
) -> Json<UserDTO> {
    Json(UserDTO::from(current_user))
}
