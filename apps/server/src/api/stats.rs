//! Read endpoint for synced campaign statistics.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::Deserialize;

use adboard_core::stats::{CampaignDayStat, DateWindow};

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

fn parse_date(value: &str, param: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("Invalid `{}` date: {}", param, value)))
}

/// Window for a stats read: explicit `from`/`to` when given, otherwise the
/// configured sync window ending today. `to` alone keeps the window length.
fn resolve_window(
    query: &StatsQuery,
    today: NaiveDate,
    window_days: u32,
) -> Result<DateWindow, ApiError> {
    let to = match query.to.as_deref() {
        Some(value) => parse_date(value, "to")?,
        None => today,
    };
    let window = match query.from.as_deref() {
        Some(value) => DateWindow {
            from: parse_date(value, "from")?,
            to,
        },
        None => DateWindow::ending_at(to, window_days),
    };
    if window.from > window.to {
        return Err(ApiError::BadRequest(
            "`from` must not be after `to`".to_string(),
        ));
    }
    Ok(window)
}

/// Campaign-daily rows for a date window. The default window matches what the
/// sync ingests (`SYNC_WINDOW_DAYS`, ending today).
pub async fn get_campaign_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Json<Vec<CampaignDayStat>>> {
    let window = resolve_window(&query, Local::now().date_naive(), state.sync_window_days)?;
    let rows = state.stats_repository.load_campaign_days(&window)?;
    Ok(Json(rows))
}
