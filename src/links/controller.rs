use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::models::{LinkStatus, LinkSummary};

/// Which links the list shows by lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    Active,
    Archived,
    All,
}

impl StatusFilter {
    pub fn admits(self, status: LinkStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == LinkStatus::Active,
            StatusFilter::Archived => status == LinkStatus::Archived,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(StatusFilter::Active),
            "archived" => Ok(StatusFilter::Archived),
            "all" => Ok(StatusFilter::All),
            other => Err(format!("unknown status filter '{other}'")),
        }
    }
}

/// UI-local state of the link list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkListViewState {
    pub search_term: String,
    pub status_filter: StatusFilter,
    pub selected_ids: BTreeSet<String>,
}

/// Search, filter and multi-select over a link collection.
///
/// The collection itself is never modified; visible links are derived from
/// it on every read.
#[derive(Debug, Clone, Default)]
pub struct LinkCollectionController {
    all_links: Vec<LinkSummary>,
    state: LinkListViewState,
}

impl LinkCollectionController {
    pub fn new(links: Vec<LinkSummary>) -> Self {
        Self {
            all_links: links,
            state: LinkListViewState::default(),
        }
    }

    /// Replace the collection, dropping selections of links that are gone
    pub fn set_links(&mut self, links: Vec<LinkSummary>) {
        self.all_links = links;
        let known: BTreeSet<&str> = self.all_links.iter().map(|l| l.id.as_str()).collect();
        self.state
            .selected_ids
            .retain(|id| known.contains(id.as_str()));
    }

    pub fn all_links(&self) -> &[LinkSummary] {
        &self.all_links
    }

    pub fn state(&self) -> &LinkListViewState {
        &self.state
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.state.search_term = term.into();
    }

    pub fn search_term(&self) -> &str {
        &self.state.search_term
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.state.status_filter = filter;
    }

    pub fn status_filter(&self) -> StatusFilter {
        self.state.status_filter
    }

    pub fn selected_ids(&self) -> &BTreeSet<String> {
        &self.state.selected_ids
    }

    /// Links passing the current status filter and search term, in
    /// collection order
    pub fn visible_links(&self) -> Vec<&LinkSummary> {
        let needle = self.state.search_term.to_lowercase();
        let filter = self.state.status_filter;
        self.all_links
            .iter()
            .filter(|l| filter.admits(l.status()))
            .filter(|l| l.matches_lowercase(&needle))
            .collect()
    }

    /// Flip selection of one link. Hidden links may be toggled; ids outside
    /// the collection are rejected.
    pub fn toggle_select(&mut self, id: &str) -> CoreResult<()> {
        if !self.all_links.iter().any(|l| l.id == id) {
            return Err(CoreError::UnknownLink(id.to_string()));
        }
        if !self.state.selected_ids.remove(id) {
            self.state.selected_ids.insert(id.to_string());
        }
        Ok(())
    }

    /// Clear the selection if it is exactly the visible set, otherwise
    /// select exactly the visible set
    pub fn toggle_select_all(&mut self) {
        let visible: BTreeSet<String> = self
            .visible_links()
            .into_iter()
            .map(|l| l.id.clone())
            .collect();

        if self.state.selected_ids == visible {
            self.state.selected_ids.clear();
        } else {
            self.state.selected_ids = visible;
        }
    }

    pub fn clear_selection(&mut self) {
        self.state.selected_ids.clear();
    }

    /// Header checkbox state: something is visible and all of it is selected
    pub fn all_visible_selected(&self) -> bool {
        let visible = self.visible_links();
        !visible.is_empty()
            && visible
                .iter()
                .all(|l| self.state.selected_ids.contains(&l.id))
    }

    /// Selected links in collection order
    pub fn selected_links(&self) -> Vec<&LinkSummary> {
        self.all_links
            .iter()
            .filter(|l| self.state.selected_ids.contains(&l.id))
            .collect()
    }
}
