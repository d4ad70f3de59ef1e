//! Stats services - Totali e serie giornaliere per la home della dashboard

use crate::analytics::{DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS, TrailingWindow};
use crate::core::{AppError, AppState};
use crate::dtos::{ChartDTO, OrganizationUsageDTO, OverviewDTO, OverviewQuery, TotalsDTO};
use crate::repositories::{Count, CounterTable};
use axum::extract::{Json, Query, State};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Numero di giorni richiesto, `None` se fuori da 1..=MAX_WINDOW_DAYS
pub fn window_days(requested: Option<u32>) -> Option<u32> {
    match requested {
        None => Some(DEFAULT_WINDOW_DAYS),
        Some(days) if (1..=MAX_WINDOW_DAYS).contains(&days) => Some(days),
        Some(_) => None,
    }
}

#[instrument(skip(state))]
pub async fn overview(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OverviewQuery>, // /stats/overview?days=30
) -> Result<Json<OverviewDTO>, AppError> {
    // 1. Validare la finestra richiesta
    // 2. Calcolare i totali e le serie giornaliere in parallelo
    // 3. Riallineare ogni serie sulla finestra, riempiendo i giorni vuoti con 0
    let days = window_days(params.days).ok_or_else(|| {
        warn!("Invalid stats window: {:?}", params.days);
        AppError::bad_request("days must be between 1 and 365")
    })?;

    let window = TrailingWindow::ending_on(Utc::now().date_naive(), days);
    let since = window
        .start()
        .ok_or_else(|| AppError::internal_server_error("Empty stats window"))?;
    debug!("Computing overview from {}", since);

    let (
        organizations,
        users,
        courses,
        feedbacks,
        prompts,
        exam_scores,
        prompt_rows,
        new_user_rows,
        active_rows,
    ) = futures::try_join!(
        state.organization.count(),
        state.user.count(),
        state.course.count(),
        state.feedback.count(),
        state.stats.total(CounterTable::Prompts),
        state.exam.count(),
        state.stats.daily_since(CounterTable::Prompts, since),
        state.user.count_registered_per_day(since),
        state.stats.daily_since(CounterTable::ActiveUsers, since),
    )?;

    let chart = ChartDTO {
        labels: window.labels(),
        dates: window.iso_dates(),
        prompt_counts: window.fill(prompt_rows.into_iter().map(|r| (r.date, r.amount as i64))),
        new_user_counts: window.fill(new_user_rows),
        active_user_counts: window.fill(active_rows.into_iter().map(|r| (r.date, r.amount as i64))),
    };

    Ok(Json(OverviewDTO {
        totals: TotalsDTO {
            organizations,
            users,
            courses,
            feedbacks,
            prompts,
            exam_scores,
        },
        chart,
    }))
}

#[instrument(skip(state))]
pub async fn organization_usage(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<OrganizationUsageDTO>>, AppError> {
    let usage = state.organization.usage().await?;
    Ok(Json(usage))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_days_defaults_to_thirty() {
        assert_eq!(window_days(None), Some(30));
    }

    #[test]
    fn test_window_days_bounds() {
        assert_eq!(window_days(Some(1)), Some(1));
        assert_eq!(window_days(Some(365)), Some(365));
        assert_eq!(window_days(Some(0)), None);
        assert_eq!(window_days(Some(366)), None);
    }
}
