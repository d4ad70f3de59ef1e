//! Contatori giornalieri (tabelle active_users e prompts_stat)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Riga di un contatore indicizzato per data: una riga per giorno
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DailyCounter {
    pub date: NaiveDate,
    pub amount: i32,
}
