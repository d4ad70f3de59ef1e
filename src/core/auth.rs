use crate::core::{AppError, AppState};
use crate::entities::{User, UserRole};
use crate::repositories::Read;
use axum::extract::State;
use axum::{body::Body, extract::Request, http, http::Response, middleware::Next};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Nome del cookie di sessione impostato al login
pub const SESSION_COOKIE: &str = "token";

// struct che codifica il contenuto del token jwt
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize, // Expiry time of the token
    pub iat: usize, // Issued at time of the token
    pub id: String,
    pub email: String,
}

#[instrument(skip(secret), fields(email = %email, id = %id))]
pub fn encode_jwt(
    id: &str,
    email: &str,
    secret: &str,
    ttl_hours: i64,
) -> Result<String, AppError> {
    debug!("Encoding JWT token for user");
    let now = Utc::now();
    let exp = Duration::try_hours(ttl_hours)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .filter(|exp| *exp > now)
        .ok_or_else(|| {
            error!("Session TTL out of range: {}h", ttl_hours);
            AppError::internal_server_error("Invalid session lifetime")
        })?
        .timestamp() as usize;
    let iat = now.timestamp() as usize;
    let claim = Claims {
        iat,
        exp,
        id: id.to_string(),
        email: email.to_string(),
    };

    encode(
        &Header::default(),
        &claim,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        error!("Failed to encode JWT token: {:?}", e);
        AppError::internal_server_error("Error in encoding jwt token")
    })
}

#[instrument(skip(jwt_token, secret))]
pub fn decode_jwt(jwt_token: &str, secret: &str) -> Result<TokenData<Claims>, AppError> {
    debug!("Decoding JWT token");
    decode(
        jwt_token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        warn!("Failed to decode JWT token: {:?}", e);
        AppError::unauthorized("Unable to decode token")
    })
}

/// Cookie di sessione HttpOnly; `Secure` solo in produzione (in sviluppo si gira su http)
pub fn session_cookie(token: &str, ttl_hours: i64, secure: bool) -> String {
    format!(
        "{}={}; HttpOnly;{} SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        token,
        if secure { " Secure;" } else { "" },
        ttl_hours.max(0).saturating_mul(60 * 60)
    )
}

pub fn expired_session_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE)
}

/// Estrae il token da `Authorization: Bearer ...` oppure dal cookie di sessione
pub fn extract_token(headers: &http::HeaderMap) -> Option<String> {
    let from_header = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            let mut parts = value.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => {
                    Some(token.to_string())
                }
                _ => None,
            }
        });

    from_header.or_else(|| {
        headers
            .get_all(http::header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
            .map(|(_, value)| value.to_string())
    })
}

#[instrument(skip(state, req, next))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running authentication middleware");
    let token = extract_token(req.headers()).ok_or_else(|| {
        warn!("Missing session token");
        AppError::unauthorized("Please log in to access the dashboard")
    })?;

    let token_data = decode_jwt(&token, &state.jwt_secret)?;

    // Fetch the user details from the database
    let current_user = match state.user.read(&token_data.claims.id).await? {
        Some(user) => {
            debug!("User authenticated: {}", user.email);
            user
        }
        None => {
            warn!("User not found in database: {}", token_data.claims.id);
            return Err(AppError::unauthorized("You are not an authorized user"));
        }
    };

    req.extensions_mut().insert(current_user);
    Ok(next.run(req).await)
}

/// Middleware che ammette solo gli amministratori; va montato dopo authentication_middleware
#[instrument(skip(req, next))]
pub async fn admin_only_middleware(req: Request, next: Next) -> Result<Response<Body>, AppError> {
    let current_user = req.extensions().get::<User>().ok_or_else(|| {
        warn!("User not found in request extensions");
        AppError::unauthorized("User not authenticated")
    })?;

    require_role(current_user, &[UserRole::Admin])?;

    Ok(next.run(req).await)
}

/// Helper function per verificare che un utente abbia uno dei ruoli richiesti
#[instrument(skip(user), fields(user_id = %user.id))]
pub fn require_role(user: &User, allowed_roles: &[UserRole]) -> Result<(), AppError> {
    if !allowed_roles.contains(&user.role) {
        warn!(
            "User {} has insufficient role {:?}, required one of: {:?}",
            user.id, user.role, allowed_roles
        );
        return Err(AppError::forbidden("Insufficient role").with_details(format!(
            "This action requires one of the following roles: {:?}",
            allowed_roles
        )));
    }

    info!("Role check passed for user {} with role {}", user.id, user.role);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, StatusCode};
    use chrono::NaiveDate;

    const SECRET: &str = "segreto-dei-test";

    fn user_with_role(role: UserRole) -> User {
        User {
            id: "u-test".into(),
            username: "tester".into(),
            email: "tester@ambalearn.io".into(),
            password_hash: None,
            google_id: None,
            picture: None,
            birthday: None,
            registered_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            last_login: None,
            organization_id: None,
            role,
        }
    }

    #[test]
    fn test_jwt_roundtrip_keeps_identity() {
        let token = encode_jwt("u-admin", "admin@ambalearn.io", SECRET, 1).unwrap();
        let data = decode_jwt(&token, SECRET).unwrap();
        assert_eq!(data.claims.id, "u-admin");
        assert_eq!(data.claims.email, "admin@ambalearn.io");
        assert!(data.claims.exp > data.claims.iat);
    }

    #[test]
    fn test_jwt_with_wrong_secret_is_rejected() {
        let token = encode_jwt("u-admin", "admin@ambalearn.io", SECRET, 1).unwrap();
        let err = decode_jwt(&token, "altro-segreto").unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_jwt_with_out_of_range_ttl_is_an_error() {
        let err = encode_jwt("u", "a@b.io", SECRET, 9_999_999_999_999).unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(encode_jwt("u", "a@b.io", SECRET, i64::MIN).is_err());
    }

    #[test]
    fn test_session_cookie_max_age_saturates() {
        let cookie = session_cookie("t", i64::MAX / 10, false);
        assert!(cookie.ends_with(&format!("Max-Age={}", i64::MAX)));
        assert!(session_cookie("t", -1, false).ends_with("Max-Age=0"));
    }

    #[test]
    fn test_extract_token_prefers_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        headers.insert(
            http::header::COOKIE,
            HeaderValue::from_static("token=from-cookie"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_extract_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::COOKIE,
            HeaderValue::from_static("theme=dark; token=abc.def.ghi; lang=it"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("abc.def.ghi"));

        let mut empty = HeaderMap::new();
        empty.insert(http::header::COOKIE, HeaderValue::from_static("token="));
        assert_eq!(extract_token(&empty), None);
    }

    #[test]
    fn test_session_cookie_flags() {
        let cookie = session_cookie("abc", 24, true);
        assert!(cookie.starts_with("token=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(!session_cookie("abc", 24, false).contains("Secure"));
        assert!(expired_session_cookie().contains("Max-Age=0"));
    }

    #[test]
    fn test_require_role() {
        assert!(require_role(&user_with_role(UserRole::Admin), &[UserRole::Admin]).is_ok());
        let err = require_role(&user_with_role(UserRole::Manager), &[UserRole::Admin]).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }
}
