//! Integration tests for the JSON API
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot` over a
//! fixture-backed source and a pinned clock.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use linkdash::analytics::{AnalyticsAggregator, BreakdownLimits, FixedClock};
use linkdash::api::{create_api_router, AppState};
use linkdash::storage::{CachedSource, Fixture, InMemorySource};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

const FIXTURE: &str = r#"{
    "links": [
        {"id": "1", "title": "YouTube", "shortCode": "4tLWAad", "originalUrl": "https://www.youtube.com/watch?v=GYTvdRdEUBs", "createdAt": "2025-03-09T00:00:00Z", "tags": ["video"]},
        {"id": "2", "title": "Example", "shortCode": "ex4mple", "originalUrl": "https://example.com", "createdAt": "2025-03-01T00:00:00Z"},
        {"id": "3", "title": "Old promo", "shortCode": "pr0mo", "originalUrl": "https://promo.example.com", "createdAt": "2025-01-01T00:00:00Z", "archived": true}
    ],
    "clicks": {
        "1": [
            {"occursAt": "2025-03-30T09:00:00Z", "deviceClass": "desktop", "referrer": "https://www.linkedin.com/", "country": "United States"},
            {"occursAt": "2025-03-30T10:00:00Z", "deviceClass": "desktop", "country": "United States"},
            {"occursAt": "2025-03-31T11:00:00Z", "deviceClass": "mobile", "referrer": "https://www.google.com/", "country": "Germany"},
            {"occursAt": "2025-03-31T12:00:00Z", "deviceClass": "tablet"}
        ]
    }
}"#;

fn app() -> Router {
    let source = Arc::new(InMemorySource::from_fixture(Fixture::from_json(FIXTURE).unwrap()));
    let cached = Arc::new(CachedSource::new(source.clone(), 100, 60));
    let aggregator = Arc::new(AnalyticsAggregator::new_with_config(
        cached,
        Arc::new(FixedClock(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap())),
        "bit.ly",
        BreakdownLimits::default(),
    ));

    create_api_router(Arc::new(AppState {
        links: source,
        aggregator,
    }))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_list_links_defaults_to_active() {
    let (status, json) = get(app(), "/api/links").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 2);
    assert_eq!(json["links"][0]["id"], "1");
    assert_eq!(json["links"][0]["clickCount"], 4);
}

#[tokio::test]
async fn test_list_links_search_and_status() {
    let (_, json) = get(app(), "/api/links?search=yt").await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["links"][0]["title"], "YouTube");

    let (_, json) = get(app(), "/api/links?search=example&status=all").await;
    assert_eq!(json["total"], 2);

    let (_, json) = get(app(), "/api/links?status=archived").await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["links"][0]["id"], "3");

    let (status, json) = get(app(), "/api/links?status=deleted").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("deleted"));
}

#[tokio::test]
async fn test_snapshot_endpoint() {
    let (status, json) = get(app(), "/api/analytics/1?range=last7days").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(json["totalClicks"], 4);
    assert_eq!(json["shortUrl"], "bit.ly/4tLWAad");
    assert_eq!(json["clickSeries"].as_array().unwrap().len(), 7);
    assert_eq!(json["clickSeries"][6]["date"], "2025-03-31");
    assert_eq!(json["clickSeries"][6]["clicks"], 2);

    assert_eq!(json["deviceBreakdown"][0]["name"], "Desktop");
    assert_eq!(json["deviceBreakdown"][0]["value"], 2);
    assert_eq!(json["deviceBreakdown"][0]["percentage"], 0.5);
    assert_eq!(json["deviceBreakdown"][0]["colorHint"], "#06b6d4");

    let referrers = json["referrerBreakdown"].as_array().unwrap();
    let direct = referrers.iter().find(|r| r["name"] == "Direct").unwrap();
    assert_eq!(direct["value"], 2);

    let locations = json["locationBreakdown"].as_array().unwrap();
    let unknown = locations.iter().find(|r| r["name"] == "Unknown").unwrap();
    assert_eq!(unknown["value"], 1);
}

#[tokio::test]
async fn test_snapshot_explicit_range_and_default() {
    let (status, json) = get(app(), "/api/analytics/1?start=2025-03-30&end=2025-03-30").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalClicks"], 2);
    assert_eq!(json["clickSeries"].as_array().unwrap().len(), 1);

    let (status, json) = get(app(), "/api/analytics/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["clickSeries"].as_array().unwrap().len(), 30);
    assert_eq!(json["totalClicks"], 0);
    assert_eq!(json["deviceBreakdown"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_snapshot_errors() {
    let (status, json) = get(app(), "/api/analytics/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("missing"));

    let (status, _) = get(app(), "/api/analytics/1?start=2025-03-30&end=2025-03-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(app(), "/api/analytics/1?start=2025-03-30").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = get(app(), "/api/analytics/1?range=yesterday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("yesterday"));
}

#[tokio::test]
async fn test_malformed_query_is_json_error() {
    let (status, json) = get(app(), "/api/analytics/1?start=2025-13-01&end=2025-03-02").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());

    let (status, json) = get(app(), "/api/links?status=bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_range_with_explicit_dates_is_rejected() {
    let (status, json) = get(
        app(),
        "/api/analytics/1?range=last7days&start=2025-03-01&end=2025-03-02",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("range"));
}

#[tokio::test]
async fn test_overview_endpoint() {
    let (status, json) = get(app(), "/api/analytics?range=last7days").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(json["linkCount"], 3);
    assert_eq!(json["totalClicks"], 4);
    assert_eq!(json["clickSeries"].as_array().unwrap().len(), 7);
    assert_eq!(json["range"]["start"], "2025-03-25");
    assert_eq!(json["deviceBreakdown"][0]["name"], "Desktop");
    assert_eq!(json["deviceBreakdown"][0]["percentage"], 0.5);

    let (status, json) = get(app(), "/api/analytics?range=alltime").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["range"]["start"], "2025-01-01");
    assert_eq!(json["totalClicks"], 4);
}
