use dotenv::dotenv;
use std::env;
use tracing::{info, warn};

const DEFAULT_JWT_SECRET: &str = "segreto-di-sviluppo-da-cambiare";

/// Durata massima di una sessione: un anno
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_host: String,
    pub server_port: u16,
    pub max_connections: u32,
    pub connection_lifetime_secs: u64,
    pub app_env: String,
    /// Base URL dell'Engine a cui viene delegato il login
    pub engine_url: String,
    pub engine_timeout_secs: u64,
    pub session_ttl_hours: i64,
    pub run_migrations: bool,
    pub seed_demo_data: bool,
}

impl Config {
    /// Carica la configurazione dalle variabili d'ambiente
    /// Chiama dotenv() automaticamente
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set in .env file".to_string())?;

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using default (not secure for production!)");
            DEFAULT_JWT_SECRET.to_string()
        });

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| "Invalid SERVER_PORT: must be a number between 0-65535".to_string())?;

        let max_connections = env::var("MAX_DB_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()
            .map_err(|_| "Invalid MAX_DB_CONNECTIONS: must be a positive number".to_string())?;

        let connection_lifetime_secs = env::var("DB_CONNECTION_LIFETIME_SECS")
            .unwrap_or_else(|_| "1800".to_string())
            .parse::<u64>()
            .map_err(|_| {
                "Invalid DB_CONNECTION_LIFETIME_SECS: must be a positive number".to_string()
            })?;

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let engine_url = env::var("ENGINE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:5000".to_string())
            .trim_end_matches('/')
            .to_string();

        let engine_timeout_secs = env::var("ENGINE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .map_err(|_| "Invalid ENGINE_TIMEOUT_SECS: must be a positive number".to_string())?;

        let session_ttl_hours = parse_session_ttl(env::var("SESSION_TTL_HOURS").ok())?;

        let run_migrations = parse_flag("RUN_MIGRATIONS", env::var("RUN_MIGRATIONS").ok())?;
        let seed_demo_data = parse_flag("SEED_DEMO_DATA", env::var("SEED_DEMO_DATA").ok())?;

        Ok(Config {
            database_url,
            jwt_secret,
            server_host,
            server_port,
            max_connections,
            connection_lifetime_secs,
            app_env,
            engine_url,
            engine_timeout_secs,
            session_ttl_hours,
            run_migrations,
            seed_demo_data,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    /// Logga la configurazione (nascondendo i segreti)
    pub fn print_info(&self) {
        info!("Dashboard configuration:");
        info!("   Environment: {}", self.app_env);
        info!("   Server Address: {}:{}", self.server_host, self.server_port);
        info!("   Database: {}", Self::mask_url(&self.database_url));
        info!("   Max DB Connections: {}", self.max_connections);
        info!("   Connection Lifetime: {}s", self.connection_lifetime_secs);
        info!("   Engine: {} (timeout {}s)", self.engine_url, self.engine_timeout_secs);
        info!("   Session TTL: {}h", self.session_ttl_hours);
        info!("   Run migrations: {}", self.run_migrations);
        info!("   Seed demo data: {}", self.seed_demo_data);
        info!(
            "   JWT Secret: {}",
            if self.jwt_secret == DEFAULT_JWT_SECRET {
                "USING DEFAULT (INSECURE!)"
            } else {
                "custom secret configured"
            }
        );
    }

    /// Maschera l'URL del database per il logging
    fn mask_url(url: &str) -> String {
        if let Some(at_pos) = url.find('@') {
            if let Some(scheme_end) = url.find("://") {
                let scheme = &url[..scheme_end + 3];
                let after_at = &url[at_pos..];
                return format!("{}***{}", scheme, after_at);
            }
        }
        "***".to_string()
    }
}

/// Durata della sessione in ore, assente = 24, ammessa in 1..=MAX_SESSION_TTL_HOURS
fn parse_session_ttl(raw: Option<String>) -> Result<i64, String> {
    raw.as_deref()
        .map(str::trim)
        .unwrap_or("24")
        .parse::<i64>()
        .ok()
        .filter(|h| (1..=MAX_SESSION_TTL_HOURS).contains(h))
        .ok_or_else(|| {
            format!(
                "Invalid SESSION_TTL_HOURS: must be a number between 1 and {}",
                MAX_SESSION_TTL_HOURS
            )
        })
}

/// Interpreta un flag booleano da env, assente = false
fn parse_flag(name: &str, raw: Option<String>) -> Result<bool, String> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) if ["1", "true", "yes", "on"].iter().any(|t| v.eq_ignore_ascii_case(t)) => Ok(true),
        Some(v) if ["0", "false", "no", "off"].iter().any(|f| v.eq_ignore_ascii_case(f)) => {
            Ok(false)
        }
        Some(_) => Err(format!("Invalid {}: expected true/false", name)),
    }
}
