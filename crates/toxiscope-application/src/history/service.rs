use crate::session_store::SessionStore;
use std::sync::Arc;
use toxiscope_core::history::{HistoryQuery, HistoryRecord, HistoryRow, ProfileStats, RecordId, RecordStore};
use toxiscope_core::session::UserId;
use toxiscope_core::{BackendError, ClientError, ClientResult};

/// Identity-scoped reads and deletes of the caller's history.
///
/// Every call reads the owner from the live session and passes it to the
/// store as an explicit filter. Without a session, calls return
/// [`ClientError::Unauthenticated`] and make no request.
pub struct HistoryService {
    session: Arc<SessionStore>,
    records: Arc<dyn RecordStore>,
}

impl HistoryService {
    pub fn new(session: Arc<SessionStore>, records: Arc<dyn RecordStore>) -> Self {
        Self { session, records }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn current_owner(&self) -> ClientResult<UserId> {
        self.session
            .identity()
            .map(|identity| identity.id)
            .ok_or(ClientError::Unauthenticated)
    }

    /// Fetches the caller's records, newest first.
    ///
    /// Rows owned by anyone else are dropped even if the store returns them.
    async fn owned_records(&self, owner: &UserId) -> ClientResult<Vec<HistoryRecord>> {
        let mut records = self.records.select(&HistoryQuery::for_owner(owner)).await?;

        let before = records.len();
        records.retain(|record| &record.user_id == owner);
        if records.len() != before {
            tracing::warn!(
                user_id = %owner,
                dropped = before - records.len(),
                "Store returned records owned by another identity"
            );
        }

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    /// The caller's history in display shape.
    pub async fn fetch_history(&self) -> ClientResult<Vec<HistoryRow>> {
        let owner = self.current_owner()?;
        let records = self.owned_records(&owner).await?;
        tracing::debug!(user_id = %owner, count = records.len(), "Fetched history");
        Ok(records.iter().map(HistoryRow::from_record).collect())
    }

    pub async fn fetch_profile_stats(&self) -> ClientResult<ProfileStats> {
        let owner = self.current_owner()?;
        let records = self.owned_records(&owner).await?;
        Ok(ProfileStats::from_records(&records))
    }

    /// Deletes one of the caller's records.
    pub async fn delete_record(&self, id: RecordId) -> ClientResult<()> {
        let owner = self.current_owner()?;
        self.records.delete(id, &owner).await.map_err(|e| match e {
            BackendError::NotFound => ClientError::failed(format!("Record {} was not found", id)),
            other => other.into(),
        })?;
        tracing::info!(user_id = %owner, record_id = %id, "Deleted history record");
        Ok(())
    }
}
