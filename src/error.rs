use chrono::NaiveDate;
use thiserror::Error;

use crate::storage::SourceError;

/// Errors surfaced by the analytics aggregator and the link collection
/// controller. Nothing here is retried; callers decide what to show.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("link '{0}' not found")]
    NotFound(String),
    #[error("link id must not be empty")]
    InvalidLinkId,
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("link '{0}' is not part of the current collection")]
    UnknownLink(String),
    #[error("fetch failed: {0}")]
    Transport(#[from] SourceError),
}

pub type CoreResult<T> = Result<T, CoreError>;
