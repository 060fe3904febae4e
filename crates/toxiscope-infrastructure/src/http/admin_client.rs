//! Admin backend over the REST service's `/admin/*` endpoints.
//!
//! That service keys users by integer id and returns naive timestamps, so
//! its rows are decoded into local DTOs and converted.

use super::envelope::ApiEnvelope;
use super::transport::{Bearer, HttpTransport, UnauthorizedPolicy, join_url};
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use toxiscope_core::BackendError;
use toxiscope_core::admin::{AdminBackend, AdminHistoryEntry, AdminUser};
use toxiscope_core::analysis::Sentiment;
use toxiscope_core::history::{HistoryRecord, RecordId, parse_timestamp};
use toxiscope_core::session::{Role, UserId};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RemoteId {
    Int(i64),
    Str(String),
}

impl From<RemoteId> for UserId {
    fn from(id: RemoteId) -> Self {
        match id {
            RemoteId::Int(n) => UserId::new(n.to_string()),
            RemoteId::Str(s) => UserId::new(s),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserRow {
    id: RemoteId,
    #[serde(default)]
    name: Option<String>,
    email: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl From<UserRow> for AdminUser {
    fn from(row: UserRow) -> Self {
        let role = match row.role.as_deref() {
            Some("admin") => Role::Admin,
            _ => Role::User,
        };
        Self {
            id: row.id.into(),
            name: row.name.unwrap_or_default(),
            email: row.email,
            role,
            created_at: row.created_at.as_deref().and_then(parse_timestamp),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HistoryRow {
    id: i64,
    user_id: RemoteId,
    input_text: String,
    toxicity_score: f64,
    cyberbullying_prob: f64,
    #[serde(default)]
    result_sarcasm: bool,
    sentiment: Sentiment,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    user_email: Option<String>,
}

impl From<HistoryRow> for AdminHistoryEntry {
    fn from(row: HistoryRow) -> Self {
        let record = HistoryRecord {
            id: RecordId(row.id),
            user_id: row.user_id.into(),
            input_text: row.input_text,
            toxicity_score: row.toxicity_score,
            cyberbullying_prob: row.cyberbullying_prob,
            result_sarcasm: row.result_sarcasm,
            sentiment: row.sentiment,
            source_url: None,
            created_at: row
                .created_at
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or_default(),
        };
        Self {
            record,
            user_name: row.user_name,
            user_email: row.user_email,
        }
    }
}

#[derive(Clone)]
pub struct RestAdminClient {
    transport: HttpTransport,
    base_url: String,
}

impl RestAdminClient {
    pub fn new(transport: HttpTransport, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = join_url(&self.base_url, path);
        let request = self.transport.request(Method::GET, &url, Bearer::Stored);
        let envelope: ApiEnvelope<T> = self
            .transport
            .execute_json(request, UnauthorizedPolicy::Notify)
            .await?;
        envelope.into_result()
    }
}

#[async_trait]
impl AdminBackend for RestAdminClient {
    async fn list_users(&self) -> Result<Vec<AdminUser>, BackendError> {
        let rows: Vec<UserRow> = self.get("/admin/users").await?;
        Ok(rows.into_iter().map(AdminUser::from).collect())
    }

    async fn list_history(&self) -> Result<Vec<AdminHistoryEntry>, BackendError> {
        let rows: Vec<HistoryRow> = self.get("/admin/history").await?;
        Ok(rows.into_iter().map(AdminHistoryEntry::from).collect())
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), BackendError> {
        let url = join_url(&self.base_url, &format!("/admin/user/{}", id));
        let request = self.transport.request(Method::DELETE, &url, Bearer::Stored);
        self.transport
            .execute(request, UnauthorizedPolicy::Notify)
            .await?;
        tracing::info!(user_id = %id, "Deleted user");
        Ok(())
    }
}
