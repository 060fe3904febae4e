//! Admin panel domain models and backend trait.

use crate::error::BackendError;
use crate::history::HistoryRecord;
use crate::session::{Role, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: Option<DateTime<Utc>>,
}

/// A history row across all users, joined with its owner's profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminHistoryEntry {
    pub record: HistoryRecord,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

/// Admin endpoints. The backend re-checks the admin role on every call.
#[async_trait]
pub trait AdminBackend: Send + Sync {
    async fn list_users(&self) -> Result<Vec<AdminUser>, BackendError>;

    async fn list_history(&self) -> Result<Vec<AdminHistoryEntry>, BackendError>;

    async fn delete_user(&self, id: &UserId) -> Result<(), BackendError>;
}
