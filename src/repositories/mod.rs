//! Repositories module - Coordinatore per tutti i repository del progetto
//!
//! Ogni repository gestisce le operazioni di database per una specifica tabella dello
//! schema condiviso con l'Engine.
//!
//! Le query usano `sqlx::query_as` con `#[derive(sqlx::FromRow)]` e non le macro
//! `query!`/`query_as!`: il crate deve compilare anche senza un MySQL raggiungibile,
//! lo schema vero lo possiede l'Engine.
//!
//! Promemoria sui metodi di fetch:
//! - `.execute()`        INSERT/UPDATE/DELETE
//! - `.fetch_optional()` zero o una riga
//! - `.fetch_one()`      esattamente una riga (aggregati come COUNT)
//! - `.fetch_all()`      tutte le righe
//!
//! Le funzioni associate che prendono `&mut MySqlConnection` vanno chiamate dentro una
//! transazione (`&mut tx`), servono per le modifiche su più tabelle.

pub mod course;
pub mod exam_score;
pub mod feedback;
pub mod organization;
pub mod setting;
pub mod stats;
pub mod traits;
pub mod user;

// Re-esportazione dei trait per facilitare l'import
pub use traits::{Count, Delete, Read};

// Re-esportazione delle struct dei repository per facilitare l'import
pub use course::CourseRepository;
pub use exam_score::ExamScoreRepository;
pub use feedback::{FeedbackRepository, NewFeedback};
pub use organization::{NewOrganization, OrganizationDetails, OrganizationRepository};
pub use setting::SettingRepository;
pub use stats::{CounterTable, StatsRepository};
pub use user::{NewUser, UserChanges, UserRepository};

/// Pattern per una ricerca "contiene" da usare con `LIKE ? ESCAPE '!'`:
/// `%` e `_` scritti dall'utente restano caratteri letterali
pub(crate) fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '!' | '%' | '_') {
            pattern.push('!');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
