//! Application State - Stato globale dell'applicazione
//!
//! Contiene tutti i repository, il client verso l'Engine e la configurazione
//! delle sessioni condivisa da route e middleware.

use crate::core::engine::EngineClient;
use crate::repositories::{
    CourseRepository, ExamScoreRepository, FeedbackRepository, OrganizationRepository,
    SettingRepository, StatsRepository, UserRepository,
};
use sqlx::{MySql, MySqlPool, Transaction};

pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState {
    /// Repository per la gestione degli utenti
    pub user: UserRepository,

    /// Repository per la gestione delle organizzazioni
    pub organization: OrganizationRepository,

    pub course: CourseRepository,
    pub feedback: FeedbackRepository,
    pub exam: ExamScoreRepository,

    /// Contatori giornalieri (prompt e utenti attivi)
    pub stats: StatsRepository,

    pub setting: SettingRepository,

    /// Client HTTP verso AmbaLearn-Engine, usato per verificare le credenziali
    pub engine: EngineClient,

    /// Secret key per JWT token
    pub jwt_secret: String,

    /// Durata della sessione in ore
    pub session_ttl_hours: i64,

    /// Cookie con flag Secure
    pub secure_cookies: bool,
}

impl AppState {
    /// Crea una nuova istanza di AppState inizializzando tutti i repository
    /// con il pool di connessioni fornito.
    pub fn new(pool: MySqlPool, jwt_secret: String, engine: EngineClient) -> Self {
        Self {
            user: UserRepository::new(pool.clone()),
            organization: OrganizationRepository::new(pool.clone()),
            course: CourseRepository::new(pool.clone()),
            feedback: FeedbackRepository::new(pool.clone()),
            exam: ExamScoreRepository::new(pool.clone()),
            stats: StatsRepository::new(pool.clone()),
            setting: SettingRepository::new(pool),
            engine,
            jwt_secret,
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            secure_cookies: false,
        }
    }

    /// Apre una transazione sul pool condiviso dai repository
    pub async fn begin(&self) -> Result<Transaction<'static, MySql>, sqlx::Error> {
        self.user.begin().await
    }

    pub fn with_session_ttl_hours(mut self, hours: i64) -> Self {
        self.session_ttl_hours = hours;
        self
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }
}
