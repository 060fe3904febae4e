//! Application layer for Toxiscope.
//!
//! Coordinates the collaborator traits from `toxiscope-core` into the
//! client-side state logic: the session store, identity-scoped history
//! fetching, the analysis flow, route guarding and the global 401 policy.

pub mod admin_service;
pub mod analysis;
pub mod auth_failure;
pub mod history;
pub mod route_guard;
pub mod session_store;
pub mod view_scope;

pub use admin_service::AdminService;
pub use analysis::{AnalysisFlow, AnalysisOutcome, AnalyzeForm};
pub use auth_failure::AuthFailurePolicy;
pub use history::{HistoryService, HistoryView, LoadStatus};
pub use route_guard::{GuardDecision, RouteGuard};
pub use session_store::{ChangeListener, SessionSnapshot, SessionStore, SessionSubscription};
pub use view_scope::ViewScope;
