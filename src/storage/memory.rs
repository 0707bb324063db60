use anyhow::Context;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use crate::analytics::{ClickEvent, ResolvedRange};
use crate::models::LinkSummary;
use crate::storage::{ClickSource, LinkSource, SourceError, SourceResult};

/// On-disk fixture layout: links in display order plus click events per link id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub links: Vec<LinkSummary>,
    #[serde(default)]
    pub clicks: HashMap<String, Vec<ClickEvent>>,
}

impl Fixture {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Failed to parse fixture JSON")
    }

    pub async fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read fixture file {}", path.display()))?;
        Self::from_json(&raw)
    }
}

/// Deterministic in-memory source backing both fetch collaborators
pub struct InMemorySource {
    /// Link ids in display order
    order: RwLock<Vec<String>>,
    links: DashMap<String, LinkSummary>,
    clicks: DashMap<String, Vec<ClickEvent>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self {
            order: RwLock::new(Vec::new()),
            links: DashMap::new(),
            clicks: DashMap::new(),
        }
    }

    pub fn from_fixture(fixture: Fixture) -> Self {
        let source = Self::new();
        for link in fixture.links {
            source.insert_link(link);
        }
        for (link_id, events) in fixture.clicks {
            for event in events {
                source.record_click(&link_id, event);
            }
        }
        source
    }

    /// Add or replace a link; new links go to the end of the display order
    pub fn insert_link(&self, link: LinkSummary) {
        let id = link.id.clone();
        if self.links.insert(id.clone(), link).is_none() {
            if let Ok(mut order) = self.order.write() {
                order.push(id);
            }
        }
    }

    pub fn record_click(&self, link_id: &str, event: ClickEvent) {
        self.clicks.entry(link_id.to_string()).or_default().push(event);
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl Default for InMemorySource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClickSource for InMemorySource {
    async fn fetch_link(&self, link_id: &str) -> SourceResult<Option<LinkSummary>> {
        Ok(self.links.get(link_id).map(|entry| entry.value().clone()))
    }

    async fn fetch_click_history(
        &self,
        link_id: &str,
        window: Option<&ResolvedRange>,
    ) -> SourceResult<Vec<ClickEvent>> {
        let Some(events) = self.clicks.get(link_id) else {
            return Ok(Vec::new());
        };

        let history = events
            .iter()
            .filter(|e| window.map_or(true, |w| w.contains(e.day())))
            .cloned()
            .collect();
        Ok(history)
    }
}

#[async_trait]
impl LinkSource for InMemorySource {
    async fn fetch_link_summaries(&self) -> SourceResult<Vec<LinkSummary>> {
        let order = self
            .order
            .read()
            .map_err(|_| SourceError::Unavailable("link order lock poisoned".to_string()))?;

        let mut summaries = Vec::with_capacity(order.len());
        for id in order.iter() {
            if let Some(link) = self.links.get(id) {
                let mut link = link.value().clone();
                if let Some(events) = self.clicks.get(id) {
                    link.click_count = link.click_count.max(events.len() as u64);
                }
                summaries.push(link);
            }
        }
        Ok(summaries)
    }
}
