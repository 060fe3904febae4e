//! Auth backend and 401-handling traits.

use super::model::{AuthChange, Credentials, Session};
use crate::error::BackendError;
use async_trait::async_trait;
use tokio::sync::broadcast;

/// The hosted auth service.
///
/// Every method that changes the session returns the [`AuthChange`] it also
/// publishes on [`AuthBackend::changes`], carrying the same sequence number,
/// so a store that applies the returned change will ignore the echo.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Restores any existing session (e.g. from a persisted token).
    ///
    /// # Returns
    ///
    /// - `Ok(Some(session))`: A valid session exists
    /// - `Ok(None)`: No session, or the persisted one is no longer honored
    /// - `Err(_)`: The backend could not be reached
    async fn current_session(&self) -> Result<Option<Session>, BackendError>;

    /// Opens a new stream of session changes (cross-tab logout, refresh, expiry).
    ///
    /// Dropping the receiver unsubscribes.
    fn changes(&self) -> broadcast::Receiver<AuthChange>;

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<AuthChange, BackendError>;

    async fn sign_up_with_password(&self, credentials: &Credentials) -> Result<AuthChange, BackendError>;

    /// Revokes the session on the backend. Only returns `Ok` once the backend confirmed.
    async fn sign_out(&self, session: &Session) -> Result<AuthChange, BackendError>;

    async fn update_password(&self, session: &Session, new_password: &str) -> Result<(), BackendError>;
}

/// Response-level interceptor target: invoked by the transport whenever a
/// protected call comes back 401.
pub trait UnauthorizedHandler: Send + Sync {
    fn on_unauthorized(&self);
}
