//! Engine client - Proxy HTTP verso AmbaLearn-Engine
//!
//! La dashboard non verifica mai le password: il login viene inoltrato all'Engine,
//! che gestisce hash, last_login e gli altri side-effect dell'autenticazione.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const LOGIN_PATH: &str = "/api/auth/login";

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// L'Engine ha rifiutato le credenziali
    InvalidCredentials,
    /// Status HTTP non previsto
    Unexpected(u16),
    /// Errore di rete o timeout
    Unreachable(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidCredentials => write!(f, "invalid credentials"),
            EngineError::Unexpected(status) => write!(f, "unexpected engine status {}", status),
            EngineError::Unreachable(reason) => write!(f, "engine unreachable: {}", reason),
        }
    }
}

impl std::error::Error for EngineError {}

#[derive(Serialize)]
struct EngineLoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Risposta dell'Engine, tutti i campi sono opzionali perchè ci serve solo lo status
#[derive(Deserialize, Debug, Default, Clone)]
pub struct EngineLogin {
    #[serde(default)]
    pub user: Option<EngineUser>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct EngineUser {
    pub id: Option<String>,
    pub email: Option<String>,
}

impl EngineLogin {
    /// `true` se l'account indicato dall'Engine (quando lo indica) è quello trovato nel database
    pub fn confirms(&self, user_id: &str, email: &str) -> bool {
        match &self.user {
            None => true,
            Some(user) => {
                user.id.as_deref().is_none_or(|id| id == user_id)
                    && user.email.as_deref().is_none_or(|e| e.eq_ignore_ascii_case(email))
            }
        }
    }
}

pub struct EngineClient {
    http: reqwest::Client,
    base_url: String,
}

impl EngineClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, EngineError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Unreachable(format!("http client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<EngineLogin, EngineError> {
        let url = format!("{}{}", self.base_url, LOGIN_PATH);
        debug!("Forwarding login to engine at {}", url);

        let resp = self
            .http
            .post(&url)
            .json(&EngineLoginRequest { email, password })
            .send()
            .await
            .map_err(|e| {
                warn!("Engine request failed: {}", e);
                EngineError::Unreachable(e.to_string())
            })?;

        let status = resp.status();
        match status {
            s if s.is_success() => {
                // corpo non JSON o vuoto: il login resta valido
                let body = resp.json::<EngineLogin>().await.unwrap_or_default();
                info!("Engine accepted credentials");
                Ok(body)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!("Engine rejected credentials with status {}", status);
                Err(EngineError::InvalidCredentials)
            }
            other => {
                warn!("Engine answered with unexpected status {}", other);
                Err(EngineError::Unexpected(other.as_u16()))
            }
        }
    }
}
