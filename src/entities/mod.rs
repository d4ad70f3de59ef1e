//! Entities module - Entità del dominio applicativo
//!
//! Questo modulo contiene tutte le entità (models) che rappresentano i dati persistiti nel database
//! condiviso con AmbaLearn-Engine. Ogni entity corrisponde a una tabella.

pub mod course;
pub mod enums;
pub mod exam_score;
pub mod feedback;
pub mod organization;
pub mod setting;
pub mod stats;
pub mod user;

// Re-exports per facilitare l'import
pub use course::CourseMetadata;
pub use enums::{Sentiment, UserRole};
pub use exam_score::ExamScore;
pub use feedback::Feedback;
pub use organization::Organization;
pub use setting::SystemSetting;
pub use stats::DailyCounter;
pub use user::User;
