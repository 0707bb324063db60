use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::CoreResult;
use crate::links::LinkCollectionController;
use crate::models::LinkSummary;
use crate::screen::RequestSequence;
use crate::storage::LinkSource;

/// Link management screen: loads the collection and owns its view state
pub struct LinksScreen {
    source: Arc<dyn LinkSource>,
    sequence: RequestSequence,
    controller: Mutex<LinkCollectionController>,
    loading: AtomicBool,
    torn_down: AtomicBool,
}

impl LinksScreen {
    pub fn new(source: Arc<dyn LinkSource>) -> Self {
        Self {
            source,
            sequence: RequestSequence::new(),
            controller: Mutex::new(LinkCollectionController::default()),
            loading: AtomicBool::new(false),
            torn_down: AtomicBool::new(false),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Reload the collection. Returns `false` when a newer refresh or a
    /// teardown superseded this one.
    pub async fn refresh(&self) -> CoreResult<bool> {
        if self.torn_down.load(Ordering::SeqCst) {
            return Ok(false);
        }
        let ticket = self.sequence.issue();
        self.loading.store(true, Ordering::SeqCst);

        let result = self.source.fetch_link_summaries().await;

        let mut controller = self.controller.lock().await;
        if !self.sequence.is_current(ticket) {
            debug!("Discarding stale link collection response");
            return Ok(false);
        }
        self.loading.store(false, Ordering::SeqCst);

        let links = result?;
        info!("Loaded {} links", links.len());
        controller.set_links(links);
        Ok(true)
    }

    /// Run `f` against the controller
    pub async fn update<R>(&self, f: impl FnOnce(&mut LinkCollectionController) -> R) -> R {
        let mut controller = self.controller.lock().await;
        f(&mut controller)
    }

    /// Owned copy of the currently visible links
    pub async fn visible_links(&self) -> Vec<LinkSummary> {
        let controller = self.controller.lock().await;
        controller.visible_links().into_iter().cloned().collect()
    }

    pub async fn teardown(&self) {
        self.torn_down.store(true, Ordering::SeqCst);
        self.sequence.invalidate();
        self.loading.store(false, Ordering::SeqCst);
    }
}
