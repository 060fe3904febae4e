//! Pure projections over history collections.
//!
//! None of these functions mutate their input; views recompute their visible
//! projection from the canonical collection whenever sort, filter or the
//! collection itself changes.

use super::model::{HistoryRecord, HistoryRow, RecordId};
use crate::analysis::Sentiment;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum::{Display, EnumIter, EnumString};

/// A row counts as toxic when either score is strictly above this.
pub const TOXIC_THRESHOLD: f64 = 0.5;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Latest,
    Oldest,
    ToxicityDesc,
    CyberbullyingDesc,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FilterKey {
    #[default]
    All,
    Toxic,
    Safe,
    Positive,
    Negative,
}

/// Anything that carries a record id, so the reducer works on both stored
/// records and display rows.
pub trait Keyed {
    fn record_id(&self) -> RecordId;
}

impl Keyed for HistoryRow {
    fn record_id(&self) -> RecordId {
        self.id
    }
}

impl Keyed for HistoryRecord {
    fn record_id(&self) -> RecordId {
        self.id
    }
}

pub fn is_toxic(row: &HistoryRow) -> bool {
    row.toxicity > TOXIC_THRESHOLD || row.cyberbullying > TOXIC_THRESHOLD
}

impl FilterKey {
    pub fn matches(self, row: &HistoryRow) -> bool {
        match self {
            FilterKey::All => true,
            FilterKey::Toxic => is_toxic(row),
            FilterKey::Safe => !is_toxic(row),
            FilterKey::Positive => row.sentiment == Sentiment::Positive,
            FilterKey::Negative => row.sentiment == Sentiment::Negative,
        }
    }
}

impl SortKey {
    fn compare(self, a: &HistoryRow, b: &HistoryRow) -> Ordering {
        let primary = match self {
            SortKey::Latest => b.created_at.cmp(&a.created_at),
            SortKey::Oldest => a.created_at.cmp(&b.created_at),
            SortKey::ToxicityDesc => b.toxicity.total_cmp(&a.toxicity),
            SortKey::CyberbullyingDesc => b.cyberbullying.total_cmp(&a.cyberbullying),
        };
        // Newest first, then id, so equal keys still give one deterministic order.
        primary
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| b.id.cmp(&a.id))
    }
}

/// Filters then sorts a copy of `records`.
pub fn apply_sort_and_filter(records: &[HistoryRow], sort: SortKey, filter: FilterKey) -> Vec<HistoryRow> {
    let mut projected: Vec<HistoryRow> = records.iter().filter(|row| filter.matches(row)).cloned().collect();
    projected.sort_by(|a, b| sort.compare(a, b));
    projected
}

/// Returns `collection` without the element whose id is `id`.
pub fn remove_by_id<T: Keyed + Clone>(collection: &[T], id: RecordId) -> Vec<T> {
    collection.iter().filter(|item| item.record_id() != id).cloned().collect()
}
