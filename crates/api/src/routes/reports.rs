//! Demand report endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use chrono::NaiveDate;
use order_store::OrderStore;
use reporting::{OrderSummary, ReportWindow, WeeklyItemTotal};
use serde::Deserialize;

use crate::error::ApiError;
use crate::routes::orders::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportParams {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Both dates or neither; with neither the report covers the trailing week.
fn window_from(params: &ReportParams) -> Result<Option<ReportWindow>, ApiError> {
    match (params.start, params.end) {
        (Some(start), Some(end)) => {
            if end < start {
                return Err(ApiError::BadRequest(
                    "end date is before start date".to_string(),
                ));
            }
            Ok(Some(ReportWindow::from_dates(start, end)))
        }
        (None, None) => Ok(None),
        _ => Err(ApiError::BadRequest(
            "start and end must be given together".to_string(),
        )),
    }
}

/// GET /reports/weekly — per-item totals over the window.
#[tracing::instrument(skip(state))]
pub async fn weekly<S, C>(
    State(state): State<Arc<AppState<S, C>>>,
    Query(params): Query<ReportParams>,
) -> Result<Json<OrderSummary>, ApiError>
where
    S: OrderStore + 'static,
    C: Send + Sync + 'static,
{
    let window = window_from(&params)?;
    let summary = state.reports.weekly_report(window).await?;
    Ok(Json(summary))
}

/// GET /reports/weekly/grouped — per-item totals bucketed by week.
#[tracing::instrument(skip(state))]
pub async fn grouped<S, C>(
    State(state): State<Arc<AppState<S, C>>>,
    Query(params): Query<ReportParams>,
) -> Result<Json<Vec<WeeklyItemTotal>>, ApiError>
where
    S: OrderStore + 'static,
    C: Send + Sync + 'static,
{
    let window = window_from(&params)?;
    let rows = state.reports.grouped_weekly_report(window).await?;
    Ok(Json(rows))
}
