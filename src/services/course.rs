//! Course services - Metadati dei corsi in sola lettura

use crate::core::{AppError, AppState};
use crate::dtos::{CourseDTO, CourseDetailDTO, CourseQuery, ExamStatsDTO};
use axum::extract::{Json, Path, Query, State};
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[instrument(skip(state, params))]
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CourseQuery>, // /courses?organization_id=...&owner_id=...
) -> Result<Json<Vec<CourseDTO>>, AppError> {
    debug!("Listing courses");
    let courses = state.course.list(&params).await?;
    info!("Found {} courses", courses.len());
    Ok(Json(courses))
}

#[instrument(skip(state), fields(course_uid = %uid))]
pub async fn get_course(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Json<CourseDetailDTO>, AppError> {
    let (course, feedbacks) = futures::try_join!(
        state.course.find_dto(&uid),
        state.feedback.for_course(&uid),
    )?;

    let course = course.ok_or_else(|| AppError::not_found("Course not found"))?;
    Ok(Json(CourseDetailDTO { course, feedbacks }))
}

#[instrument(skip(state))]
pub async fn exam_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ExamStatsDTO>>, AppError> {
    let stats = state.exam.stats_per_exam().await?;
    debug!("Computed stats for {} exams", stats.len());
    Ok(Json(stats))
}
