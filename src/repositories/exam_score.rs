//! ExamScoreRepository - Punteggi degli esami

use super::Count;
use crate::analytics::rounded_average;
use crate::dtos::ExamStatsDTO;
use crate::entities::ExamScore;
use sqlx::{Error, MySqlConnection, MySqlPool};

pub struct ExamScoreRepository {
    connection_pool: MySqlPool,
}

impl ExamScoreRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    pub async fn for_user(&self, user_id: &str) -> Result<Vec<ExamScore>, Error> {
        sqlx::query_as::<_, ExamScore>(
            r#"
            SELECT id, user_id, exam_id, exam_title, score, exam_date
            FROM exam_scores
            WHERE user_id = ?
            ORDER BY exam_date DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Tentativi, media e miglior punteggio per esame.
    /// La media viene calcolata qui per evitare il DECIMAL restituito da AVG().
    pub async fn stats_per_exam(&self) -> Result<Vec<ExamStatsDTO>, Error> {
        let rows: Vec<(String, String, i64, i64, i64)> = sqlx::query_as(
            r#"
            SELECT
                exam_id,
                MAX(exam_title),
                COUNT(*),
                CAST(COALESCE(SUM(score), 0) AS SIGNED),
                CAST(COALESCE(MAX(score), 0) AS SIGNED)
            FROM exam_scores
            GROUP BY exam_id
            ORDER BY exam_id
            "#,
        )
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(exam_id, exam_title, attempts, total, best)| ExamStatsDTO {
                exam_id,
                exam_title,
                attempts,
                average_score: rounded_average(total, attempts),
                best_score: best,
            })
            .collect())
    }

    pub async fn insert(
        conn: &mut MySqlConnection,
        user_id: &str,
        exam_id: &str,
        exam_title: &str,
        score: i32,
    ) -> Result<(), Error> {
        sqlx::query("INSERT INTO exam_scores (user_id, exam_id, exam_title, score) VALUES (?, ?, ?, ?)")
            .bind(user_id)
            .bind(exam_id)
            .bind(exam_title)
            .bind(score)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn delete_for_user(conn: &mut MySqlConnection, user_id: &str) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM exam_scores WHERE user_id = ?")
            .bind(user_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}

impl Count for ExamScoreRepository {
    async fn count(&self) -> Result<i64, Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM exam_scores")
            .fetch_one(&self.connection_pool)
            .await
    }
}
