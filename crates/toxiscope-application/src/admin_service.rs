use crate::session_store::SessionStore;
use std::sync::Arc;
use toxiscope_core::admin::{AdminBackend, AdminHistoryEntry, AdminUser};
use toxiscope_core::session::{Identity, UserId};
use toxiscope_core::{BackendError, ClientError, ClientResult};

/// Admin panel operations. Every call requires a signed-in admin.
pub struct AdminService {
    session: Arc<SessionStore>,
    backend: Arc<dyn AdminBackend>,
}

impl AdminService {
    pub fn new(session: Arc<SessionStore>, backend: Arc<dyn AdminBackend>) -> Self {
        Self { session, backend }
    }

    fn require_admin(&self) -> ClientResult<Identity> {
        let identity = self.session.identity().ok_or(ClientError::Unauthenticated)?;
        if !identity.is_admin() {
            return Err(ClientError::failed("Admin access required"));
        }
        Ok(identity)
    }

    pub async fn list_users(&self) -> ClientResult<Vec<AdminUser>> {
        self.require_admin()?;
        Ok(self.backend.list_users().await?)
    }

    pub async fn list_history(&self) -> ClientResult<Vec<AdminHistoryEntry>> {
        self.require_admin()?;
        Ok(self.backend.list_history().await?)
    }

    /// Deletes another user's account. Deleting your own is refused locally.
    pub async fn delete_user(&self, id: &UserId) -> ClientResult<()> {
        let admin = self.require_admin()?;
        if &admin.id == id {
            return Err(ClientError::validation("Cannot delete your own account"));
        }

        self.backend.delete_user(id).await.map_err(|e| match e {
            BackendError::NotFound => ClientError::failed("User not found"),
            other => other.into(),
        })?;
        tracing::info!(admin_id = %admin.id, user_id = %id, "Admin deleted user");
        Ok(())
    }
}
