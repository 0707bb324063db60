//! Click analytics for shortened links
//!
//! Raw [`ClickEvent`]s are bucketed per calendar day and partitioned by
//! device, referrer and country into a [`LinkAnalyticsSnapshot`].

pub mod aggregator;
pub mod classify;
pub mod models;
pub mod range;

pub use aggregator::{summarize, AnalyticsAggregator, BreakdownLimits, ClickSummary};
pub use models::{
    percentage, AnalyticsOverview, BreakdownEntry, CategoryBreakdown, ClickEvent, ClickSeriesPoint, DeviceClass,
    LinkAnalyticsSnapshot,
};
pub use range::{Clock, DateRange, FixedClock, ResolvedRange, SystemClock};
