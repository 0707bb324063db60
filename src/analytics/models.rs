//! Data models for analytics

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::range::ResolvedRange;

/// Coarse device class a click originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Desktop,
    Mobile,
    Tablet,
    Unknown,
    Other,
}

impl DeviceClass {
    /// Display name used as the breakdown category
    pub fn label(self) -> &'static str {
        match self {
            DeviceClass::Desktop => "Desktop",
            DeviceClass::Mobile => "Mobile",
            DeviceClass::Tablet => "Tablet",
            DeviceClass::Unknown => "Unknown",
            DeviceClass::Other => "Other",
        }
    }

    /// Chart color for this class
    pub fn color_hint(self) -> &'static str {
        match self {
            DeviceClass::Desktop => "#06b6d4",
            DeviceClass::Mobile => "#3b82f6",
            DeviceClass::Tablet => "#6366f1",
            DeviceClass::Unknown => "#f59e0b",
            DeviceClass::Other => "#d1d5db",
        }
    }
}

impl Default for DeviceClass {
    fn default() -> Self {
        DeviceClass::Unknown
    }
}

/// A single recorded click on a shortened link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawClickEvent")]
pub struct ClickEvent {
    /// When the click happened
    pub occurs_at: DateTime<Utc>,

    pub device_class: DeviceClass,

    /// Referring URL or host, absent for direct traffic
    pub referrer: Option<String>,

    /// Country name or code, absent when it could not be resolved
    pub country: Option<String>,
}

/// Click as it arrives from a collaborator: either already classified or
/// carrying the raw `User-Agent` it was requested with
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClickEvent {
    occurs_at: DateTime<Utc>,
    #[serde(default)]
    device_class: Option<DeviceClass>,
    #[serde(default)]
    user_agent: Option<String>,
    #[serde(default)]
    referrer: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl From<RawClickEvent> for ClickEvent {
    fn from(raw: RawClickEvent) -> Self {
        let device_class = raw
            .device_class
            .unwrap_or_else(|| DeviceClass::from_user_agent(raw.user_agent.as_deref()));
        Self {
            occurs_at: raw.occurs_at,
            device_class,
            referrer: raw.referrer,
            country: raw.country,
        }
    }
}

impl ClickEvent {
    /// UTC calendar day the click is bucketed into
    pub fn day(&self) -> NaiveDate {
        self.occurs_at.date_naive()
    }
}

/// Clicks recorded on one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickSeriesPoint {
    pub date: NaiveDate,
    pub clicks: u64,
}

/// One named category in a breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownEntry {
    pub name: String,
    pub value: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_hint: Option<String>,
}

impl BreakdownEntry {
    /// Share of `total` this entry represents, in `0.0..=1.0`
    pub fn percentage(&self, total: u64) -> f64 {
        percentage(self.value, total)
    }
}

/// `value / total`, defined as zero when there are no clicks at all
pub fn percentage(value: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        value as f64 / total as f64
    }
}

/// Partition of clicks by one dimension, ordered by value descending with
/// any `Other` bucket last
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryBreakdown {
    entries: Vec<BreakdownEntry>,
}

impl CategoryBreakdown {
    pub const OTHER: &'static str = "Other";

    pub(crate) fn from_entries(mut entries: Vec<BreakdownEntry>) -> Self {
        entries.retain(|e| e.value > 0);
        entries.sort_by(|a, b| {
            (a.name == Self::OTHER)
                .cmp(&(b.name == Self::OTHER))
                .then_with(|| b.value.cmp(&a.value))
                .then_with(|| a.name.cmp(&b.name))
        });
        Self { entries }
    }

    pub fn entries(&self) -> &[BreakdownEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&BreakdownEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.value).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keep the `limit` largest named entries and fold the rest into `Other`.
    ///
    /// An existing `Other` entry never counts against the limit and absorbs
    /// the folded tail, so names stay unique and the total is unchanged.
    pub fn collapse_tail(self, limit: usize) -> Self {
        let (mut other, named): (Vec<_>, Vec<_>) = self
            .entries
            .into_iter()
            .partition(|e| e.name == Self::OTHER);

        if named.len() <= limit {
            let mut entries = named;
            entries.append(&mut other);
            return Self::from_entries(entries);
        }

        let mut entries = named;
        let tail = entries.split_off(limit);
        let folded: u64 = tail.iter().map(|e| e.value).sum::<u64>()
            + other.iter().map(|e| e.value).sum::<u64>();
        let color_hint = other.pop().and_then(|e| e.color_hint);

        entries.push(BreakdownEntry {
            name: Self::OTHER.to_string(),
            value: folded,
            color_hint,
        });
        Self::from_entries(entries)
    }
}

/// Fully computed analytics for one link over one date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkAnalyticsSnapshot {
    pub link_id: String,
    pub original_url: String,
    pub short_url: String,
    pub created_at: DateTime<Utc>,
    pub range: ResolvedRange,
    pub total_clicks: u64,
    pub click_series: Vec<ClickSeriesPoint>,
    pub device_breakdown: CategoryBreakdown,
    pub referrer_breakdown: CategoryBreakdown,
    pub location_breakdown: CategoryBreakdown,
}

impl LinkAnalyticsSnapshot {
    /// Share of this snapshot's total clicks, zero for an idle link
    pub fn percentage_of(&self, value: u64) -> f64 {
        percentage(value, self.total_clicks)
    }
}

/// Clicks across every link of the account over one date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsOverview {
    pub range: ResolvedRange,
    pub link_count: usize,
    pub total_clicks: u64,
    pub click_series: Vec<ClickSeriesPoint>,
    pub device_breakdown: CategoryBreakdown,
    pub referrer_breakdown: CategoryBreakdown,
    pub location_breakdown: CategoryBreakdown,
}
