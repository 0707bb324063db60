use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use crate::analytics::{ClickEvent, ResolvedRange};
use crate::models::LinkSummary;
use crate::storage::{ClickSource, SourceResult};

type HistoryKey = (String, Option<ResolvedRange>);

/// Read-through cache in front of a [`ClickSource`].
///
/// Only successful fetches are cached, and unknown links are never
/// cached so a link added later is found immediately. Entries expire by
/// time-to-live; no background task is spawned.
pub struct CachedSource {
    inner: Arc<dyn ClickSource>,
    links: Cache<String, LinkSummary>,
    histories: Cache<HistoryKey, Arc<Vec<ClickEvent>>>,
}

impl CachedSource {
    pub fn new(inner: Arc<dyn ClickSource>, max_cache_entries: u64, ttl_secs: u64) -> Self {
        let ttl = Duration::from_secs(ttl_secs);
        let links = Cache::builder()
            .max_capacity(max_cache_entries)
            .time_to_live(ttl)
            .build();
        let histories = Cache::builder()
            .max_capacity(max_cache_entries)
            .time_to_live(ttl)
            .build();

        Self {
            inner,
            links,
            histories,
        }
    }
}

#[async_trait]
impl ClickSource for CachedSource {
    async fn fetch_link(&self, link_id: &str) -> SourceResult<Option<LinkSummary>> {
        if let Some(cached) = self.links.get(link_id).await {
            return Ok(Some(cached));
        }

        let result = self.inner.fetch_link(link_id).await?;
        if let Some(ref link) = result {
            self.links.insert(link_id.to_string(), link.clone()).await;
        }
        Ok(result)
    }

    async fn fetch_click_history(
        &self,
        link_id: &str,
        window: Option<&ResolvedRange>,
    ) -> SourceResult<Vec<ClickEvent>> {
        let key = (link_id.to_string(), window.copied());
        if let Some(cached) = self.histories.get(&key).await {
            return Ok(cached.as_ref().clone());
        }

        let history = self.inner.fetch_click_history(link_id, window).await?;
        self.histories.insert(key, Arc::new(history.clone())).await;
        Ok(history)
    }
}
