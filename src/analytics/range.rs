//! Date range selection and resolution to concrete calendar days

use chrono::{Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Source of "today" for resolving relative presets
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock, UTC calendar day
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock pinned to one day, used for reproducible output
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Window a snapshot is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateRange {
    Last7Days,
    Last30Days,
    Last3Months,
    AllTime,
    /// Explicit inclusive window
    Between { start: NaiveDate, end: NaiveDate },
}

impl Default for DateRange {
    fn default() -> Self {
        DateRange::Last30Days
    }
}

impl DateRange {
    /// Build an explicit window, rejecting `start > end`
    pub fn between(start: NaiveDate, end: NaiveDate) -> CoreResult<Self> {
        if start > end {
            return Err(CoreError::InvalidRange { start, end });
        }
        Ok(DateRange::Between { start, end })
    }

    /// Resolve everything except `AllTime`, which depends on the history.
    /// Returns `Ok(None)` for `AllTime`.
    pub fn resolve_fixed(&self, today: NaiveDate) -> CoreResult<Option<ResolvedRange>> {
        let resolved = match *self {
            DateRange::Last7Days => ResolvedRange::trailing_days(today, 7),
            DateRange::Last30Days => ResolvedRange::trailing_days(today, 30),
            DateRange::Last3Months => {
                let start = today
                    .checked_sub_months(Months::new(3))
                    .and_then(|d| d.checked_add_days(Days::new(1)))
                    .unwrap_or(NaiveDate::MIN);
                ResolvedRange { start, end: today }
            }
            DateRange::Between { start, end } => {
                if start > end {
                    return Err(CoreError::InvalidRange { start, end });
                }
                ResolvedRange { start, end }
            }
            DateRange::AllTime => return Ok(None),
        };
        Ok(Some(resolved))
    }

    /// Resolve `AllTime` from the link's creation day and the days its
    /// history actually spans.
    pub fn resolve_all_time(
        today: NaiveDate,
        created: NaiveDate,
        history: impl IntoIterator<Item = NaiveDate>,
    ) -> ResolvedRange {
        let mut start = created.min(today);
        let mut end = today;
        for day in history {
            start = start.min(day);
            end = end.max(day);
        }
        ResolvedRange { start, end }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DateRange::Last7Days => "last7days",
            DateRange::Last30Days => "last30days",
            DateRange::Last3Months => "last3months",
            DateRange::AllTime => "alltime",
            DateRange::Between { .. } => "custom",
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRange::Between { start, end } => write!(f, "{start}..{end}"),
            preset => f.write_str(preset.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown date range preset '{0}'")]
pub struct UnknownPreset(pub String);

impl FromStr for DateRange {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "last7days" => Ok(DateRange::Last7Days),
            "last30days" => Ok(DateRange::Last30Days),
            "last3months" => Ok(DateRange::Last3Months),
            "alltime" => Ok(DateRange::AllTime),
            _ => Err(UnknownPreset(s.to_string())),
        }
    }
}

/// Concrete inclusive window of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ResolvedRange {
    fn trailing_days(today: NaiveDate, days: u64) -> Self {
        let start = today
            .checked_sub_days(Days::new(days - 1))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Number of calendar days covered
    pub fn len_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// Every day in the window, ascending
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_presets_end_today() {
        let today = day(2025, 3, 31);

        let week = DateRange::Last7Days.resolve_fixed(today).unwrap().unwrap();
        assert_eq!(week.start, day(2025, 3, 25));
        assert_eq!(week.len_days(), 7);

        let month = DateRange::Last30Days.resolve_fixed(today).unwrap().unwrap();
        assert_eq!(month.start, day(2025, 3, 2));
        assert_eq!(month.end, today);
        assert_eq!(month.len_days(), 30);

        let quarter = DateRange::Last3Months.resolve_fixed(today).unwrap().unwrap();
        assert_eq!(quarter.start, day(2025, 1, 1));

        assert_eq!(DateRange::AllTime.resolve_fixed(today).unwrap(), None);
    }

    #[test]
    fn test_between_rejects_inverted() {
        let err = DateRange::between(day(2025, 2, 2), day(2025, 2, 1)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRange { .. }));

        let inverted = DateRange::Between {
            start: day(2025, 2, 2),
            end: day(2025, 2, 1),
        };
        assert!(inverted.resolve_fixed(day(2025, 3, 1)).is_err());

        let single = DateRange::between(day(2025, 2, 1), day(2025, 2, 1)).unwrap();
        let resolved = single.resolve_fixed(day(2025, 3, 1)).unwrap().unwrap();
        assert_eq!(resolved.days().collect::<Vec<_>>(), vec![day(2025, 2, 1)]);
    }

    #[test]
    fn test_all_time_spans_creation_and_history() {
        let resolved = DateRange::resolve_all_time(
            day(2025, 3, 10),
            day(2025, 3, 5),
            vec![day(2025, 3, 4), day(2025, 3, 12)],
        );
        assert_eq!(resolved.start, day(2025, 3, 4));
        assert_eq!(resolved.end, day(2025, 3, 12));
    }

    #[test]
    fn test_parse_presets() {
        assert_eq!("last7days".parse(), Ok(DateRange::Last7Days));
        assert_eq!("allTime".parse(), Ok(DateRange::AllTime));
        assert_eq!("last_3_months".parse(), Ok(DateRange::Last3Months));
        assert!("yesterday".parse::<DateRange>().is_err());
    }
}
