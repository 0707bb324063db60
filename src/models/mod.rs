mod link;

pub use link::{LinkStatus, LinkSummary};
