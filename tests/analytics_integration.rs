//! Integration tests for snapshot aggregation
//!
//! These tests drive the aggregator through the in-memory source with a
//! pinned clock, so every snapshot is reproducible.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use linkdash::analytics::{
    AnalyticsAggregator, BreakdownLimits, ClickEvent, DateRange, DeviceClass, FixedClock,
    ResolvedRange,
};
use linkdash::error::CoreError;
use linkdash::models::LinkSummary;
use linkdash::storage::{ClickSource, InMemorySource, SourceError, SourceResult};
use std::collections::BTreeSet;
use std::sync::Arc;

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).unwrap()
}

fn today() -> NaiveDate {
    day(3, 31)
}

fn link(id: &str, created: NaiveDate) -> LinkSummary {
    LinkSummary {
        id: id.to_string(),
        title: "YouTube".to_string(),
        short_code: "yt4video".to_string(),
        original_url: "https://www.youtube.com/watch?v=GYTvdRdEUEs".to_string(),
        created_at: Utc.from_utc_datetime(&created.and_hms_opt(0, 0, 0).unwrap()),
        tags: BTreeSet::new(),
        click_count: 0,
        archived: false,
    }
}

fn click(on: NaiveDate, device: DeviceClass, referrer: Option<&str>, country: Option<&str>) -> ClickEvent {
    ClickEvent {
        occurs_at: Utc.from_utc_datetime(&on.and_hms_opt(14, 30, 0).unwrap()),
        device_class: device,
        referrer: referrer.map(str::to_string),
        country: country.map(str::to_string),
    }
}

fn aggregator(source: Arc<InMemorySource>) -> AnalyticsAggregator {
    AnalyticsAggregator::new_with_config(
        source,
        Arc::new(FixedClock(today())),
        "yourbrnd.co",
        BreakdownLimits::default(),
    )
}

/// A month of varied traffic on link "1"
fn busy_source() -> Arc<InMemorySource> {
    let source = Arc::new(InMemorySource::new());
    source.insert_link(link("1", day(2, 15)));

    let devices = [
        DeviceClass::Desktop,
        DeviceClass::Mobile,
        DeviceClass::Tablet,
        DeviceClass::Unknown,
        DeviceClass::Other,
    ];
    let referrers = [
        Some("https://www.linkedin.com/feed/"),
        Some("https://www.google.com/"),
        None,
        Some("https://t.co/abc"),
        Some("https://news.ycombinator.com/"),
    ];
    let countries = [
        Some("United States"),
        Some("United Kingdom"),
        Some("Germany"),
        None,
        Some("India"),
        Some("Canada"),
        Some("France"),
    ];

    let mut n = 0usize;
    let start = day(2, 15);
    for offset in 0..45 {
        let on = start + Duration::days(offset);
        for _ in 0..(offset % 4) {
            source.record_click(
                "1",
                click(
                    on,
                    devices[n % devices.len()],
                    referrers[n % referrers.len()],
                    countries[n % countries.len()],
                ),
            );
            n += 1;
        }
    }
    source
}

#[tokio::test]
async fn test_worked_example_two_day_range() {
    let source = Arc::new(InMemorySource::new());
    source.insert_link(link("1", day(3, 1)));
    for _ in 0..5 {
        source.record_click("1", click(day(3, 10), DeviceClass::Desktop, None, None));
    }
    for _ in 0..3 {
        source.record_click("1", click(day(3, 10), DeviceClass::Mobile, None, None));
    }
    for _ in 0..2 {
        source.record_click("1", click(day(3, 11), DeviceClass::Desktop, None, None));
    }

    let range = DateRange::between(day(3, 10), day(3, 11)).unwrap();
    let snapshot = aggregator(source).get_snapshot("1", range).await.unwrap();

    let series: Vec<_> = snapshot.click_series.iter().map(|p| (p.date, p.clicks)).collect();
    assert_eq!(series, vec![(day(3, 10), 8), (day(3, 11), 2)]);
    assert_eq!(snapshot.total_clicks, 10);

    let devices: Vec<_> = snapshot
        .device_breakdown
        .entries()
        .iter()
        .map(|e| (e.name.as_str(), e.value))
        .collect();
    assert_eq!(devices, vec![("Desktop", 7), ("Mobile", 3)]);
    assert_eq!(snapshot.short_url, "yourbrnd.co/yt4video");
}

#[tokio::test]
async fn test_totals_agree_for_every_preset() {
    let aggregator = aggregator(busy_source());

    for range in [
        DateRange::Last7Days,
        DateRange::Last30Days,
        DateRange::Last3Months,
        DateRange::AllTime,
    ] {
        let snapshot = aggregator.get_snapshot("1", range).await.unwrap();
        let series_total: u64 = snapshot.click_series.iter().map(|p| p.clicks).sum();

        assert_eq!(series_total, snapshot.total_clicks, "{range}");
        assert_eq!(snapshot.device_breakdown.total(), snapshot.total_clicks, "{range}");
        assert_eq!(snapshot.referrer_breakdown.total(), snapshot.total_clicks, "{range}");
        assert_eq!(snapshot.location_breakdown.total(), snapshot.total_clicks, "{range}");

        // One point per day, strictly ascending
        assert_eq!(snapshot.click_series.len(), snapshot.range.len_days(), "{range}");
        assert!(snapshot
            .click_series
            .windows(2)
            .all(|w| w[0].date + Duration::days(1) == w[1].date));

        // Names are unique within each breakdown
        for breakdown in [
            &snapshot.device_breakdown,
            &snapshot.referrer_breakdown,
            &snapshot.location_breakdown,
        ] {
            let names: BTreeSet<_> = breakdown.entries().iter().map(|e| &e.name).collect();
            assert_eq!(names.len(), breakdown.len());
        }
    }
}

#[tokio::test]
async fn test_preset_windows() {
    let aggregator = aggregator(busy_source());

    let week = aggregator.get_snapshot("1", DateRange::Last7Days).await.unwrap();
    assert_eq!(week.range, ResolvedRange { start: day(3, 25), end: today() });
    assert_eq!(week.click_series.len(), 7);

    let month = aggregator.get_snapshot("1", DateRange::Last30Days).await.unwrap();
    assert_eq!(month.click_series.len(), 30);

    // History ends 2025-03-31, link created 2025-02-15
    let all = aggregator.get_snapshot("1", DateRange::AllTime).await.unwrap();
    assert_eq!(all.range.start, day(2, 15));
    assert_eq!(all.range.end, today());
    assert!(all.total_clicks >= month.total_clicks);
}

#[tokio::test]
async fn test_snapshot_is_deterministic() {
    let aggregator = aggregator(busy_source());

    let first = aggregator.get_snapshot("1", DateRange::Last30Days).await.unwrap();
    let second = aggregator.get_snapshot("1", DateRange::Last30Days).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_location_collapses_to_top_five_plus_other() {
    let aggregator = aggregator(busy_source());
    let snapshot = aggregator.get_snapshot("1", DateRange::AllTime).await.unwrap();

    // Seven distinct country labels are recorded
    assert_eq!(snapshot.location_breakdown.len(), 6);
    let last = snapshot.location_breakdown.entries().last().unwrap();
    assert_eq!(last.name, "Other");
}

#[tokio::test]
async fn test_idle_link_has_zero_percentages() {
    let source = Arc::new(InMemorySource::new());
    source.insert_link(link("idle", day(3, 1)));
    let snapshot = aggregator(source)
        .get_snapshot("idle", DateRange::Last7Days)
        .await
        .unwrap();

    assert_eq!(snapshot.total_clicks, 0);
    assert!(snapshot.click_series.iter().all(|p| p.clicks == 0));
    assert_eq!(snapshot.percentage_of(0), 0.0);
    for entry in snapshot.device_breakdown.entries() {
        assert_eq!(entry.percentage(snapshot.total_clicks), 0.0);
    }
}

#[tokio::test]
async fn test_error_conditions() {
    let aggregator = aggregator(busy_source());

    let err = aggregator
        .get_snapshot("nope", DateRange::Last7Days)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(id) if id == "nope"));

    let err = aggregator.get_snapshot("", DateRange::Last7Days).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidLinkId));

    let inverted = DateRange::Between {
        start: day(3, 20),
        end: day(3, 10),
    };
    let err = aggregator.get_snapshot("1", inverted).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidRange { .. }));
}

struct DownSource;

#[async_trait]
impl ClickSource for DownSource {
    async fn fetch_link(&self, _link_id: &str) -> SourceResult<Option<LinkSummary>> {
        Err(SourceError::Unavailable("connection refused".to_string()))
    }

    async fn fetch_click_history(
        &self,
        _link_id: &str,
        _window: Option<&ResolvedRange>,
    ) -> SourceResult<Vec<ClickEvent>> {
        Err(SourceError::Unavailable("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_transport_errors_propagate() {
    let aggregator = AnalyticsAggregator::new_with_config(
        Arc::new(DownSource),
        Arc::new(FixedClock(today())),
        "bit.ly",
        BreakdownLimits::default(),
    );

    let err = aggregator
        .get_snapshot("1", DateRange::Last7Days)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Transport(SourceError::Unavailable(_))));
}
