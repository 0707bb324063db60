//! Per-screen owners of async fetches and UI-local state
//!
//! Each screen issues at most one logical request at a time. Every request
//! takes a ticket from a [`RequestSequence`]; a response is applied only if
//! its ticket is still the newest, so a slow stale response can never
//! overwrite the state set by a later one. Tearing a screen down aborts any
//! pending work.

mod analytics;
mod links;
mod sequence;

pub use analytics::{AnalyticsScreen, AnalyticsView};
pub use links::LinksScreen;
pub use sequence::RequestSequence;
