use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::analytics::AnalyticsAggregator;
use crate::error::CoreError;
use crate::links::{LinkCollectionController, StatusFilter};
use crate::models::LinkSummary;
use crate::storage::LinkSource;

pub struct AppState {
    pub links: Arc<dyn LinkSource>,
    pub aggregator: Arc<AnalyticsAggregator>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(super) fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

/// Malformed query strings get the same JSON error body as every other 400
pub(super) fn bad_query(rejection: QueryRejection) -> Response {
    error_response(StatusCode::BAD_REQUEST, rejection.body_text())
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            CoreError::NotFound(_) | CoreError::UnknownLink(_) => StatusCode::NOT_FOUND,
            CoreError::InvalidLinkId | CoreError::InvalidRange { .. } => StatusCode::BAD_REQUEST,
            CoreError::Transport(e) => {
                tracing::error!("Upstream fetch failed: {}", e);
                StatusCode::BAD_GATEWAY
            }
        };
        error_response(status, self.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: Option<String>,
    /// active, archived or all
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub links: Vec<LinkSummary>,
    pub total: usize,
}

pub async fn health_check() -> &'static str {
    "OK"
}

/// List links, narrowed by search term and status filter
pub async fn list_links(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return bad_query(rejection),
    };

    let status = match query.status.as_deref().map(str::parse::<StatusFilter>) {
        None => None,
        Some(Ok(status)) => Some(status),
        Some(Err(e)) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    let summaries = match state.links.fetch_link_summaries().await {
        Ok(summaries) => summaries,
        Err(e) => return CoreError::from(e).into_response(),
    };

    let mut controller = LinkCollectionController::new(summaries);
    if let Some(search) = query.search {
        controller.set_search_term(search);
    }
    if let Some(status) = status {
        controller.set_status_filter(status);
    }

    let links: Vec<LinkSummary> = controller.visible_links().into_iter().cloned().collect();
    let total = links.len();
    Json(LinkListResponse { links, total }).into_response()
}
