//! Protected data fetchers for the caller's history.
//!
//! - `service`: [`HistoryService`], stateless scoped reads and deletes
//! - `view`: [`HistoryView`], the view-local list state reconciled against the store

mod service;
mod view;

pub use service::HistoryService;
pub use view::{HistoryView, LoadStatus};
