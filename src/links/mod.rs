//! View state for the link management screen

mod controller;

pub use controller::{LinkCollectionController, LinkListViewState, StatusFilter};
