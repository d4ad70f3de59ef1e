//! Core Module - Componenti infrastrutturali dell'applicazione
//!
//! Questo modulo contiene tutti i componenti "core" dell'applicazione:
//! - Autenticazione, JWT e cookie di sessione
//! - Configurazione
//! - Client verso AmbaLearn-Engine
//! - Gestione errori
//! - Stato applicazione

pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod state;

// Re-exports per facilitare l'import
pub use auth::{
    Claims, admin_only_middleware, authentication_middleware, decode_jwt, encode_jwt,
    require_role,
};
pub use config::Config;
pub use engine::{EngineClient, EngineError};
pub use error::AppError;
pub use state::AppState;
