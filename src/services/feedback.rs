//! Feedback services - Consultazione e moderazione dei feedback

use crate::core::{AppError, AppState};
use crate::dtos::{FeedbackDTO, FeedbackQuery, FeedbackSummaryDTO, Page};
use crate::repositories::Delete;
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[instrument(skip(state, params))]
pub async fn list_feedbacks(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FeedbackQuery>, // /feedbacks?sentiment=negative&course_id=...&page=1
) -> Result<Json<Page<FeedbackDTO>>, AppError> {
    debug!("Listing feedbacks");
    let (feedbacks, total) = state.feedback.search(&params).await?;
    info!("Found {} feedbacks ({} total)", feedbacks.len(), total);
    Ok(Json(Page::new(feedbacks, total, &params.page_request())))
}

#[instrument(skip(state))]
pub async fn feedback_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FeedbackSummaryDTO>, AppError> {
    let rows = state.feedback.count_by_sentiment().await?;
    Ok(Json(FeedbackSummaryDTO::from_counts(rows)))
}

#[instrument(skip(state), fields(feedback_id = %feedback_id))]
pub async fn delete_feedback(
    State(state): State<Arc<AppState>>,
    Path(feedback_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    if !state.feedback.delete(&feedback_id).await? {
        warn!("Feedback not found");
        return Err(AppError::not_found("Feedback not found"));
    }
    info!("Feedback deleted");
    Ok(StatusCode::NO_CONTENT)
}
