pub mod cached;
pub mod memory;
pub mod trait_def;

pub use cached::CachedSource;
pub use memory::{Fixture, InMemorySource};
pub use trait_def::{ClickSource, LinkSource, SourceError, SourceResult};
