//! History domain module.
//!
//! # Module Structure
//!
//! - `model`: `HistoryRecord`, the insert draft and the display `HistoryRow`
//! - `query`: sort/filter projection and the `remove_by_id` reducer
//! - `stats`: `ProfileStats`
//!
//! The [`RecordStore`] trait is the canonical interface to the remote
//! identity-scoped record store.

mod model;
mod query;
mod stats;

pub use model::{HistoryRecord, HistoryRow, NewHistoryRecord, PREVIEW_LEN, RecordId, parse_timestamp};
pub use query::{FilterKey, Keyed, SortKey, TOXIC_THRESHOLD, apply_sort_and_filter, is_toxic, remove_by_id};
pub use stats::ProfileStats;

use crate::error::BackendError;
use crate::session::UserId;
use async_trait::async_trait;

/// Table holding analysis history rows.
pub const HISTORY_TABLE: &str = "analysis_history";

/// Ordering for a history select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryOrder {
    #[default]
    CreatedAtDesc,
    CreatedAtAsc,
}

/// Select filter. `owner` is always supplied by the caller, never inferred
/// by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub owner: UserId,
    pub order: HistoryOrder,
}

impl HistoryQuery {
    pub fn for_owner(owner: &UserId) -> Self {
        Self {
            owner: owner.clone(),
            order: HistoryOrder::CreatedAtDesc,
        }
    }
}

/// The remote identity-scoped record store for [`HISTORY_TABLE`].
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Creates a record and returns it with its backend-assigned id.
    async fn insert(&self, record: &NewHistoryRecord) -> Result<HistoryRecord, BackendError>;

    async fn select(&self, query: &HistoryQuery) -> Result<Vec<HistoryRecord>, BackendError>;

    /// Deletes `id` only if it belongs to `owner`.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The record was deleted
    /// - `Err(BackendError::NotFound)`: No record with that id is owned by `owner`
    async fn delete(&self, id: RecordId, owner: &UserId) -> Result<(), BackendError>;
}
