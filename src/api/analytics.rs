//! Analytics API handlers

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::analytics::{
    AnalyticsOverview, CategoryBreakdown, ClickSeriesPoint, DateRange, LinkAnalyticsSnapshot,
    ResolvedRange,
};
use crate::error::CoreError;

use super::handlers::{bad_query, error_response, AppState};

#[derive(Debug, Deserialize)]
pub struct AnalyticsQueryParams {
    /// Preset name (default: last30days)
    pub range: Option<String>,

    /// Explicit window start (YYYY-MM-DD), requires `end`
    pub start: Option<String>,

    /// Explicit window end (YYYY-MM-DD), requires `start`
    pub end: Option<String>,
}

fn parse_day(field: &str, raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| format!("{field} must be a YYYY-MM-DD date: {e}"))
}

impl AnalyticsQueryParams {
    fn date_range(&self) -> Result<DateRange, String> {
        match (self.start.as_deref(), self.end.as_deref()) {
            (Some(_), Some(_)) if self.range.is_some() => {
                Err("range cannot be combined with start and end".to_string())
            }
            (Some(start), Some(end)) => Ok(DateRange::Between {
                start: parse_day("start", start)?,
                end: parse_day("end", end)?,
            }),
            (None, None) => match self.range.as_deref() {
                Some(preset) => preset.parse::<DateRange>().map_err(|e| e.to_string()),
                None => Ok(DateRange::default()),
            },
            _ => Err("start and end must be given together".to_string()),
        }
    }
}

/// Resolve the requested range or produce the 400 response for it
fn requested_range(
    params: Result<Query<AnalyticsQueryParams>, QueryRejection>,
) -> Result<DateRange, Response> {
    let Query(params) = params.map_err(bad_query)?;
    params
        .date_range()
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, e))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownItem {
    pub name: String,
    pub value: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_hint: Option<String>,
    pub percentage: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotResponse {
    pub link_id: String,
    pub original_url: String,
    pub short_url: String,
    pub created_at: DateTime<Utc>,
    pub range: ResolvedRange,
    pub total_clicks: u64,
    pub click_series: Vec<ClickSeriesPoint>,
    pub device_breakdown: Vec<BreakdownItem>,
    pub referrer_breakdown: Vec<BreakdownItem>,
    pub location_breakdown: Vec<BreakdownItem>,
}

fn items(breakdown: &CategoryBreakdown, total: u64) -> Vec<BreakdownItem> {
    breakdown
        .entries()
        .iter()
        .map(|e| BreakdownItem {
            name: e.name.clone(),
            value: e.value,
            color_hint: e.color_hint.clone(),
            percentage: e.percentage(total),
        })
        .collect()
}

impl From<LinkAnalyticsSnapshot> for SnapshotResponse {
    fn from(s: LinkAnalyticsSnapshot) -> Self {
        let total = s.total_clicks;
        Self {
            device_breakdown: items(&s.device_breakdown, total),
            referrer_breakdown: items(&s.referrer_breakdown, total),
            location_breakdown: items(&s.location_breakdown, total),
            link_id: s.link_id,
            original_url: s.original_url,
            short_url: s.short_url,
            created_at: s.created_at,
            range: s.range,
            total_clicks: s.total_clicks,
            click_series: s.click_series,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub range: ResolvedRange,
    pub link_count: usize,
    pub total_clicks: u64,
    pub click_series: Vec<ClickSeriesPoint>,
    pub device_breakdown: Vec<BreakdownItem>,
    pub referrer_breakdown: Vec<BreakdownItem>,
    pub location_breakdown: Vec<BreakdownItem>,
}

impl From<AnalyticsOverview> for OverviewResponse {
    fn from(o: AnalyticsOverview) -> Self {
        let total = o.total_clicks;
        Self {
            device_breakdown: items(&o.device_breakdown, total),
            referrer_breakdown: items(&o.referrer_breakdown, total),
            location_breakdown: items(&o.location_breakdown, total),
            range: o.range,
            link_count: o.link_count,
            total_clicks: o.total_clicks,
            click_series: o.click_series,
        }
    }
}

/// Get clicks across every link
pub async fn get_overview(
    State(state): State<Arc<AppState>>,
    params: Result<Query<AnalyticsQueryParams>, QueryRejection>,
) -> Response {
    let range = match requested_range(params) {
        Ok(range) => range,
        Err(response) => return response,
    };

    let links = match state.links.fetch_link_summaries().await {
        Ok(links) => links,
        Err(e) => return CoreError::from(e).into_response(),
    };

    match state.aggregator.get_overview(&links, range).await {
        Ok(overview) => Json(OverviewResponse::from(overview)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get the analytics snapshot for a link
pub async fn get_link_analytics(
    State(state): State<Arc<AppState>>,
    Path(link_id): Path<String>,
    params: Result<Query<AnalyticsQueryParams>, QueryRejection>,
) -> Response {
    let range = match requested_range(params) {
        Ok(range) => range,
        Err(response) => return response,
    };

    match state.aggregator.get_snapshot(&link_id, range).await {
        Ok(snapshot) => Json(SnapshotResponse::from(snapshot)).into_response(),
        Err(e) => e.into_response(),
    }
}
