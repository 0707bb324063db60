use async_trait::async_trait;
use thiserror::Error;

use crate::analytics::{ClickEvent, ResolvedRange};
use crate::models::LinkSummary;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Provides click histories for the analytics aggregator
#[async_trait]
pub trait ClickSource: Send + Sync {
    /// Look up a single link by id
    async fn fetch_link(&self, link_id: &str) -> SourceResult<Option<LinkSummary>>;

    /// Click events for a link. `None` requests the entire history;
    /// otherwise only events on days inside `window` need to be returned.
    async fn fetch_click_history(
        &self,
        link_id: &str,
        window: Option<&ResolvedRange>,
    ) -> SourceResult<Vec<ClickEvent>>;
}

/// Provides the link collection shown on the links screen
#[async_trait]
pub trait LinkSource: Send + Sync {
    /// All links, in display order
    async fn fetch_link_summaries(&self) -> SourceResult<Vec<LinkSummary>>;
}
