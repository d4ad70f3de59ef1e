//! Feedback DTOs

use crate::entities::Sentiment;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Feedback con lo username dell'autore
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct FeedbackDTO {
    pub id: i32,
    pub user_id: String,
    pub username: Option<String>,
    pub comment: String,
    pub course_id: String,
    pub course_name: String,
    #[sqlx(try_from = "String")]
    pub sentiment: Sentiment,
    pub created_at: NaiveDateTime,
}

/// Conteggi per sentiment, sempre con tutte e quattro le chiavi
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FeedbackSummaryDTO {
    pub total: i64,
    pub by_sentiment: BTreeMap<Sentiment, i64>,
}

impl FeedbackSummaryDTO {
    /// Costruisce il riepilogo a partire dalle righe raggruppate,
    /// sommando i valori non riconosciuti in `unknown`
    pub fn from_counts(rows: impl IntoIterator<Item = (Sentiment, i64)>) -> Self {
        let mut by_sentiment: BTreeMap<Sentiment, i64> =
            Sentiment::ALL.iter().map(|s| (*s, 0)).collect();
        for (sentiment, count) in rows {
            *by_sentiment.entry(sentiment).or_insert(0) += count;
        }
        let total = by_sentiment.values().sum();
        Self {
            total,
            by_sentiment,
        }
    }
}
