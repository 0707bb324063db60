use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSummary {
    pub id: String,
    pub title: String,
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub click_count: u64,
    #[serde(default)]
    pub archived: bool,
}

impl LinkSummary {
    /// Short URL as displayed to the user, e.g. `bit.ly/4tLWAad`
    pub fn short_url(&self, short_domain: &str) -> String {
        format!("{}/{}", short_domain.trim_end_matches('/'), self.short_code)
    }

    pub fn status(&self) -> LinkStatus {
        if self.archived {
            LinkStatus::Archived
        } else {
            LinkStatus::Active
        }
    }

    /// Case-insensitive substring match against title, short code and URL.
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.title.to_lowercase().contains(needle)
            || self.short_code.to_lowercase().contains(needle)
            || self.original_url.to_lowercase().contains(needle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Active,
    Archived,
}
