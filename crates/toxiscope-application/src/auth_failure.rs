//! Global reaction to a 401 from any protected call.

use crate::session_store::SessionStore;
use std::sync::{Arc, Weak};
use toxiscope_core::local_state::TokenStore;
use toxiscope_core::route::{Navigator, Route};
use toxiscope_core::session::UnauthorizedHandler;

/// Clears the persisted token, drops the session and sends the user to sign-in.
///
/// Navigation happens once per expired session: when several in-flight calls
/// all come back 401, only the first one to reach [`SessionStore::expire`]
/// navigates.
pub struct AuthFailurePolicy {
    session: Weak<SessionStore>,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
}

impl AuthFailurePolicy {
    /// The store is held weakly; the transport that owns this handler is itself
    /// reachable from the store through the auth backend.
    pub fn new(session: &Arc<SessionStore>, tokens: Arc<dyn TokenStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            session: Arc::downgrade(session),
            tokens,
            navigator,
        }
    }
}

impl UnauthorizedHandler for AuthFailurePolicy {
    fn on_unauthorized(&self) {
        if let Err(e) = self.tokens.clear_tokens() {
            tracing::warn!("Failed to clear persisted token after 401: {}", e);
        }

        let expired = self.session.upgrade().is_some_and(|session| session.expire());
        if expired {
            tracing::info!(route = %Route::SignIn, "Redirecting after authentication failure");
            self.navigator.navigate(Route::SignIn);
        }
    }
}
