//! Record store over the hosted service's `/rest/v1` data API.

use super::hosted::HostedService;
use super::transport::{Bearer, UnauthorizedPolicy};
use async_trait::async_trait;
use reqwest::Method;
use toxiscope_core::BackendError;
use toxiscope_core::history::{
    HISTORY_TABLE, HistoryOrder, HistoryQuery, HistoryRecord, NewHistoryRecord, RecordId, RecordStore,
};
use toxiscope_core::session::UserId;

const RETURN_REPRESENTATION: &str = "return=representation";

#[derive(Clone)]
pub struct HostedRecordStore {
    service: HostedService,
}

impl HostedRecordStore {
    pub fn new(service: HostedService) -> Self {
        Self { service }
    }

    fn table_path() -> String {
        format!("/rest/v1/{}", HISTORY_TABLE)
    }
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

fn order_param(order: HistoryOrder) -> &'static str {
    match order {
        HistoryOrder::CreatedAtDesc => "created_at.desc",
        HistoryOrder::CreatedAtAsc => "created_at.asc",
    }
}

#[async_trait]
impl RecordStore for HostedRecordStore {
    async fn insert(&self, record: &NewHistoryRecord) -> Result<HistoryRecord, BackendError> {
        let request = self
            .service
            .request(Method::POST, &Self::table_path(), Bearer::Stored)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(record);
        let mut created: Vec<HistoryRecord> = self
            .service
            .transport()
            .execute_json(request, UnauthorizedPolicy::Notify)
            .await?;

        if created.is_empty() {
            return Err(BackendError::decode("insert returned no rows"));
        }
        let created = created.swap_remove(0);
        tracing::debug!(record_id = %created.id, user_id = %created.user_id, "Inserted history record");
        Ok(created)
    }

    async fn select(&self, query: &HistoryQuery) -> Result<Vec<HistoryRecord>, BackendError> {
        let request = self
            .service
            .request(Method::GET, &Self::table_path(), Bearer::Stored)
            .query(&[
                ("select", "*".to_string()),
                ("user_id", eq(&query.owner)),
                ("order", order_param(query.order).to_string()),
            ]);
        let records: Vec<HistoryRecord> = self
            .service
            .transport()
            .execute_json(request, UnauthorizedPolicy::Notify)
            .await?;
        tracing::debug!(user_id = %query.owner, count = records.len(), "Selected history records");
        Ok(records)
    }

    async fn delete(&self, id: RecordId, owner: &UserId) -> Result<(), BackendError> {
        let request = self
            .service
            .request(Method::DELETE, &Self::table_path(), Bearer::Stored)
            .header("Prefer", RETURN_REPRESENTATION)
            .query(&[("id", eq(id)), ("user_id", eq(owner))]);
        let deleted: Vec<serde_json::Value> = self
            .service
            .transport()
            .execute_json(request, UnauthorizedPolicy::Notify)
            .await?;

        if deleted.is_empty() {
            return Err(BackendError::NotFound);
        }
        tracing::debug!(record_id = %id, user_id = %owner, "Deleted history record");
        Ok(())
    }
}
