//! StatsRepository - Contatori giornalieri di prompt e utenti attivi

use crate::entities::DailyCounter;
use chrono::NaiveDate;
use sqlx::{Error, MySqlConnection, MySqlPool};

/// Le due tabelle hanno la stessa forma (date, amount)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterTable {
    Prompts,
    ActiveUsers,
}

impl CounterTable {
    fn table(&self) -> &'static str {
        match self {
            CounterTable::Prompts => "prompts_stat",
            CounterTable::ActiveUsers => "active_users",
        }
    }
}

pub struct StatsRepository {
    connection_pool: MySqlPool,
}

impl StatsRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Righe del contatore da `since` (incluso) in poi
    pub async fn daily_since(
        &self,
        counter: CounterTable,
        since: NaiveDate,
    ) -> Result<Vec<DailyCounter>, Error> {
        sqlx::query_as::<_, DailyCounter>(&format!(
            "SELECT `date`, amount FROM {} WHERE `date` >= ? ORDER BY `date`",
            counter.table()
        ))
        .bind(since)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn total(&self, counter: CounterTable) -> Result<i64, Error> {
        sqlx::query_scalar(&format!(
            "SELECT CAST(COALESCE(SUM(amount), 0) AS SIGNED) FROM {}",
            counter.table()
        ))
        .fetch_one(&self.connection_pool)
        .await
    }

    /// Imposta il valore di un giorno, sovrascrivendo quello esistente
    pub async fn upsert(
        conn: &mut MySqlConnection,
        counter: CounterTable,
        date: NaiveDate,
        amount: i32,
    ) -> Result<(), Error> {
        sqlx::query(&format!(
            "INSERT INTO {} (`date`, amount) VALUES (?, ?) ON DUPLICATE KEY UPDATE amount = VALUES(amount)",
            counter.table()
        ))
        .bind(date)
        .bind(amount)
        .execute(conn)
        .await?;
        Ok(())
    }
}
