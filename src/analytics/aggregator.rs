//! Snapshot aggregation over a link's click history
//!
//! The aggregator resolves the requested date range, pulls the click history
//! from the injected [`ClickSource`] and folds it into a day-by-day series
//! plus device, referrer and location breakdowns. Given the same history,
//! clock and range it always produces the same snapshot.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

use crate::analytics::classify::{country_label, referrer_source};
use crate::analytics::models::{
    AnalyticsOverview, BreakdownEntry, CategoryBreakdown, ClickEvent, ClickSeriesPoint, DeviceClass,
    LinkAnalyticsSnapshot,
};
use crate::analytics::range::{Clock, DateRange, ResolvedRange, SystemClock};
use crate::error::{CoreError, CoreResult};
use crate::models::LinkSummary;
use crate::storage::ClickSource;

/// How many named categories a breakdown keeps before folding into `Other`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakdownLimits {
    pub top_locations: usize,
    pub top_referrers: usize,
}

impl Default for BreakdownLimits {
    fn default() -> Self {
        Self {
            top_locations: 5,
            top_referrers: 6,
        }
    }
}

/// Aggregated view of a click history within one window
#[derive(Debug, Clone, PartialEq)]
pub struct ClickSummary {
    pub total_clicks: u64,
    pub click_series: Vec<ClickSeriesPoint>,
    pub device_breakdown: CategoryBreakdown,
    pub referrer_breakdown: CategoryBreakdown,
    pub location_breakdown: CategoryBreakdown,
}

/// Fold `clicks` into a summary for `range`.
///
/// Events outside the window are ignored. Every day in the window gets a
/// series point, and every counted click lands in exactly one category of
/// each breakdown.
pub fn summarize(clicks: &[ClickEvent], range: ResolvedRange, limits: BreakdownLimits) -> ClickSummary {
    let mut per_day: BTreeMap<_, u64> = range.days().map(|d| (d, 0)).collect();
    let mut devices: HashMap<DeviceClass, u64> = HashMap::new();
    let mut referrers: HashMap<String, u64> = HashMap::new();
    let mut locations: HashMap<String, u64> = HashMap::new();
    let mut total_clicks = 0u64;

    for click in clicks {
        let Some(count) = per_day.get_mut(&click.day()) else {
            continue;
        };
        *count += 1;
        total_clicks += 1;

        *devices.entry(click.device_class).or_insert(0) += 1;
        *referrers
            .entry(referrer_source(click.referrer.as_deref()))
            .or_insert(0) += 1;
        *locations
            .entry(country_label(click.country.as_deref()))
            .or_insert(0) += 1;
    }

    let click_series = per_day
        .into_iter()
        .map(|(date, clicks)| ClickSeriesPoint { date, clicks })
        .collect();

    let device_breakdown = CategoryBreakdown::from_entries(
        devices
            .into_iter()
            .map(|(class, value)| BreakdownEntry {
                name: class.label().to_string(),
                value,
                color_hint: Some(class.color_hint().to_string()),
            })
            .collect(),
    );

    ClickSummary {
        total_clicks,
        click_series,
        device_breakdown,
        referrer_breakdown: named_breakdown(referrers).collapse_tail(limits.top_referrers),
        location_breakdown: named_breakdown(locations).collapse_tail(limits.top_locations),
    }
}

fn named_breakdown(counts: HashMap<String, u64>) -> CategoryBreakdown {
    CategoryBreakdown::from_entries(
        counts
            .into_iter()
            .map(|(name, value)| BreakdownEntry {
                name,
                value,
                color_hint: None,
            })
            .collect(),
    )
}

/// Builds [`LinkAnalyticsSnapshot`]s on demand
pub struct AnalyticsAggregator {
    source: Arc<dyn ClickSource>,
    clock: Arc<dyn Clock>,
    short_domain: String,
    limits: BreakdownLimits,
}

impl AnalyticsAggregator {
    /// Create an aggregator with configurable parameters
    pub fn new_with_config(
        source: Arc<dyn ClickSource>,
        clock: Arc<dyn Clock>,
        short_domain: impl Into<String>,
        limits: BreakdownLimits,
    ) -> Self {
        Self {
            source,
            clock,
            short_domain: short_domain.into(),
            limits,
        }
    }

    /// Create an aggregator on the wall clock with default limits
    pub fn new(source: Arc<dyn ClickSource>, short_domain: impl Into<String>) -> Self {
        Self::new_with_config(
            source,
            Arc::new(SystemClock),
            short_domain,
            BreakdownLimits::default(),
        )
    }

    /// Compute the analytics snapshot of `link_id` over `range`
    pub async fn get_snapshot(
        &self,
        link_id: &str,
        range: DateRange,
    ) -> CoreResult<LinkAnalyticsSnapshot> {
        if link_id.trim().is_empty() {
            return Err(CoreError::InvalidLinkId);
        }

        let today = self.clock.today();
        let fixed = range.resolve_fixed(today)?;

        let link = self
            .source
            .fetch_link(link_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(link_id.to_string()))?;

        let history = self
            .source
            .fetch_click_history(link_id, fixed.as_ref())
            .await?;

        let resolved = fixed.unwrap_or_else(|| {
            DateRange::resolve_all_time(
                today,
                link.created_at.date_naive(),
                history.iter().map(ClickEvent::day),
            )
        });

        let summary = summarize(&history, resolved, self.limits);
        debug!(
            "Computed snapshot for {} over {} ({} clicks, {} days)",
            link_id,
            range,
            summary.total_clicks,
            resolved.len_days()
        );

        Ok(LinkAnalyticsSnapshot {
            short_url: link.short_url(&self.short_domain),
            link_id: link.id,
            original_url: link.original_url,
            created_at: link.created_at,
            range: resolved,
            total_clicks: summary.total_clicks,
            click_series: summary.click_series,
            device_breakdown: summary.device_breakdown,
            referrer_breakdown: summary.referrer_breakdown,
            location_breakdown: summary.location_breakdown,
        })
    }

    /// Merge the click histories of `links` into one account-wide summary.
    ///
    /// `AllTime` spans from the oldest link's creation day to the latest
    /// click; with no links at all it covers just today.
    pub async fn get_overview(
        &self,
        links: &[LinkSummary],
        range: DateRange,
    ) -> CoreResult<AnalyticsOverview> {
        let today = self.clock.today();
        let fixed = range.resolve_fixed(today)?;

        let mut history = Vec::new();
        for link in links {
            let mut clicks = self
                .source
                .fetch_click_history(&link.id, fixed.as_ref())
                .await?;
            history.append(&mut clicks);
        }

        let resolved = fixed.unwrap_or_else(|| {
            let created = links
                .iter()
                .map(|l| l.created_at.date_naive())
                .min()
                .unwrap_or(today);
            DateRange::resolve_all_time(today, created, history.iter().map(ClickEvent::day))
        });

        let summary = summarize(&history, resolved, self.limits);
        debug!(
            "Computed overview of {} links over {} ({} clicks)",
            links.len(),
            range,
            summary.total_clicks
        );

        Ok(AnalyticsOverview {
            range: resolved,
            link_count: links.len(),
            total_clicks: summary.total_clicks,
            click_series: summary.click_series,
            device_breakdown: summary.device_breakdown,
            referrer_breakdown: summary.referrer_breakdown,
            location_breakdown: summary.location_breakdown,
        })
    }
}
