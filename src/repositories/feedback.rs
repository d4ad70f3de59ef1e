//! FeedbackRepository - Repository per i feedback sui corsi

use super::{Count, Delete, Read};
use crate::dtos::{FeedbackDTO, FeedbackQuery};
use crate::entities::{Feedback, Sentiment};
use sqlx::{Error, MySql, MySqlConnection, MySqlPool, QueryBuilder};

const SELECT_FEEDBACK: &str =
    "SELECT id, user_id, comment, course_id, course_name, sentiment, created_at FROM feedbacks";

const SELECT_FEEDBACK_DTO: &str = "SELECT f.id, f.user_id, u.username, f.comment, f.course_id, \
     f.course_name, f.sentiment, f.created_at \
     FROM feedbacks f LEFT JOIN users u ON u.id = f.user_id";

/// Feedback da inserire (usato dal seeding demo, in produzione li scrive l'Engine)
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub user_id: String,
    pub comment: String,
    pub course_id: String,
    pub course_name: String,
    pub sentiment: Sentiment,
}

pub struct FeedbackRepository {
    connection_pool: MySqlPool,
}

impl FeedbackRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    pub async fn search(&self, filter: &FeedbackQuery) -> Result<(Vec<FeedbackDTO>, i64), Error> {
        let page = filter.page_request();

        let mut count_query = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM feedbacks f");
        push_feedback_filters(&mut count_query, filter);
        let total = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.connection_pool)
            .await?;

        let mut list_query = QueryBuilder::<MySql>::new(SELECT_FEEDBACK_DTO);
        push_feedback_filters(&mut list_query, filter);
        list_query
            .push(" ORDER BY f.created_at DESC, f.id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let feedbacks = list_query
            .build_query_as::<FeedbackDTO>()
            .fetch_all(&self.connection_pool)
            .await?;

        Ok((feedbacks, total))
    }

    pub async fn for_course(&self, course_id: &str) -> Result<Vec<FeedbackDTO>, Error> {
        sqlx::query_as::<_, FeedbackDTO>(&format!(
            "{SELECT_FEEDBACK_DTO} WHERE f.course_id = ? ORDER BY f.created_at DESC, f.id DESC"
        ))
        .bind(course_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn for_user(&self, user_id: &str) -> Result<Vec<Feedback>, Error> {
        sqlx::query_as::<_, Feedback>(&format!(
            "{SELECT_FEEDBACK} WHERE user_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Conteggio grezzo per valore di sentiment salvato
    pub async fn count_by_sentiment(&self) -> Result<Vec<(Sentiment, i64)>, Error> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT sentiment, COUNT(*) FROM feedbacks GROUP BY sentiment")
                .fetch_all(&self.connection_pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(sentiment, count)| (Sentiment::from(sentiment), count))
            .collect())
    }

    pub async fn insert(conn: &mut MySqlConnection, data: &NewFeedback) -> Result<u64, Error> {
        let result = sqlx::query(
            "INSERT INTO feedbacks (user_id, comment, course_id, course_name, sentiment) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&data.user_id)
        .bind(&data.comment)
        .bind(&data.course_id)
        .bind(&data.course_name)
        .bind(data.sentiment.as_str())
        .execute(conn)
        .await?;
        Ok(result.last_insert_id())
    }

    pub async fn delete_for_user(conn: &mut MySqlConnection, user_id: &str) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM feedbacks WHERE user_id = ?")
            .bind(user_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}

fn push_feedback_filters<'a>(query: &mut QueryBuilder<'a, MySql>, filter: &'a FeedbackQuery) {
    query.push(" WHERE 1 = 1");
    if let Some(sentiment) = filter.sentiment {
        query.push(" AND f.sentiment = ").push_bind(sentiment.as_str());
    }
    if let Some(ref course_id) = filter.course_id {
        query.push(" AND f.course_id = ").push_bind(course_id.as_str());
    }
}

impl Read<Feedback, i32> for FeedbackRepository {
    async fn read(&self, id: &i32) -> Result<Option<Feedback>, Error> {
        sqlx::query_as::<_, Feedback>(&format!("{SELECT_FEEDBACK} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Delete<i32> for FeedbackRepository {
    async fn delete(&self, id: &i32) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM feedbacks WHERE id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl Count for FeedbackRepository {
    async fn count(&self) -> Result<i64, Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM feedbacks")
            .fetch_one(&self.connection_pool)
            .await
    }
}
