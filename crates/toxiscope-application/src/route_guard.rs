//! Per-route access decisions.

use crate::session_store::SessionStore;
use std::sync::Arc;
use toxiscope_core::route::{Access, Route};
use toxiscope_core::session::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session restore has not resolved; show a neutral loading state.
    Loading,
    Render,
    Redirect(Route),
}

impl GuardDecision {
    /// Decides what to do with `route` under `state`.
    ///
    /// Never redirects while the session is still loading.
    pub fn decide(route: Route, state: &SessionState) -> Self {
        if route == Route::Dashboard {
            return match state {
                SessionState::Loading => Self::Loading,
                SessionState::Authenticated(_) => Self::Redirect(Route::DashboardAnalyze),
                SessionState::Anonymous => Self::Redirect(Route::Profile),
            };
        }

        match (route.access(), state) {
            (Access::Public, _) => Self::Render,
            (_, SessionState::Loading) => Self::Loading,
            (_, SessionState::Anonymous) => Self::Redirect(Route::SignIn),
            (Access::Authenticated, SessionState::Authenticated(_)) => Self::Render,
            (Access::Admin, SessionState::Authenticated(session)) => {
                if session.identity.is_admin() {
                    Self::Render
                } else {
                    Self::Redirect(Route::Dashboard)
                }
            }
        }
    }
}

pub struct RouteGuard {
    session: Arc<SessionStore>,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    /// Decision for the current session state; may be [`GuardDecision::Loading`].
    pub fn check(&self, route: Route) -> GuardDecision {
        let decision = GuardDecision::decide(route, &self.session.state());
        tracing::debug!(route = %route, ?decision, "Route guard");
        decision
    }

    /// Waits for the session to resolve, then decides.
    pub async fn resolve(&self, route: Route) -> GuardDecision {
        let state = self.session.resolved().await;
        GuardDecision::decide(route, &state)
    }
}
