use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::analytics::{AnalyticsAggregator, DateRange, LinkAnalyticsSnapshot};
use crate::error::CoreResult;
use crate::screen::RequestSequence;

/// What the analytics screen currently shows
#[derive(Debug, Clone, Default)]
pub struct AnalyticsView {
    pub range: DateRange,
    pub loading: bool,
    pub snapshot: Option<Arc<LinkAnalyticsSnapshot>>,
    pub last_error: Option<String>,
}

/// Analytics screen for one link
pub struct AnalyticsScreen {
    link_id: String,
    aggregator: Arc<AnalyticsAggregator>,
    sequence: RequestSequence,
    view: Mutex<AnalyticsView>,
    pending: Mutex<Option<JoinHandle<()>>>,
    torn_down: AtomicBool,
}

impl AnalyticsScreen {
    pub fn new(aggregator: Arc<AnalyticsAggregator>, link_id: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            link_id: link_id.into(),
            aggregator,
            sequence: RequestSequence::new(),
            view: Mutex::new(AnalyticsView::default()),
            pending: Mutex::new(None),
            torn_down: AtomicBool::new(false),
        })
    }

    pub fn link_id(&self) -> &str {
        &self.link_id
    }

    pub async fn view(&self) -> AnalyticsView {
        self.view.lock().await.clone()
    }

    /// Fetch the snapshot for `range` and apply it.
    ///
    /// Returns `Ok(None)` when a newer request superseded this one (or the
    /// screen was torn down) before the response arrived; the response is
    /// discarded in that case, errors included.
    pub async fn load(&self, range: DateRange) -> CoreResult<Option<Arc<LinkAnalyticsSnapshot>>> {
        if self.torn_down.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let ticket = self.sequence.issue();
        self.begin(range).await;
        let result = self.aggregator.get_snapshot(&self.link_id, range).await;
        self.apply(ticket, range, result).await
    }

    /// Switch to `range` in the background, aborting any fetch in flight.
    /// Failures are recorded in the view.
    ///
    /// The spawned task only holds a weak reference to the screen, so
    /// dropping the last handle runs `Drop` and aborts it.
    pub async fn select_range(self: &Arc<Self>, range: DateRange) {
        if self.torn_down.load(Ordering::SeqCst) {
            return;
        }
        let ticket = self.sequence.issue();
        self.begin(range).await;

        let screen: Weak<Self> = Arc::downgrade(self);
        let aggregator = Arc::clone(&self.aggregator);
        let link_id = self.link_id.clone();
        let handle = tokio::spawn(async move {
            let result = aggregator.get_snapshot(&link_id, range).await;
            let Some(screen) = screen.upgrade() else {
                return;
            };
            if let Err(e) = screen.apply(ticket, range, result).await {
                warn!("Analytics fetch for {} failed: {}", link_id, e);
            }
        });

        if let Some(previous) = self.pending.lock().await.replace(handle) {
            previous.abort();
        }
    }

    /// Abort pending work; later responses and requests are ignored
    pub async fn teardown(&self) {
        self.torn_down.store(true, Ordering::SeqCst);
        self.sequence.invalidate();
        if let Some(handle) = self.pending.lock().await.take() {
            handle.abort();
        }
        info!("Analytics screen for {} torn down", self.link_id);
    }

    async fn begin(&self, range: DateRange) {
        let mut view = self.view.lock().await;
        view.range = range;
        view.loading = true;
    }

    async fn apply(
        &self,
        ticket: u64,
        range: DateRange,
        result: CoreResult<LinkAnalyticsSnapshot>,
    ) -> CoreResult<Option<Arc<LinkAnalyticsSnapshot>>> {
        let mut view = self.view.lock().await;
        if !self.sequence.is_current(ticket) {
            debug!(
                "Discarding stale analytics response for {} ({})",
                self.link_id, range
            );
            return Ok(None);
        }

        view.loading = false;
        match result {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                view.snapshot = Some(Arc::clone(&snapshot));
                view.last_error = None;
                Ok(Some(snapshot))
            }
            Err(e) => {
                view.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

impl Drop for AnalyticsScreen {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.get_mut().take() {
            handle.abort();
        }
    }
}
