//! Client-side routes and the navigation seam.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Home,
    About,
    Services,
    Contact,
    /// Public analyzer; saving still needs a session.
    Analyze,
    SignIn,
    SignUp,
    History,
    Dashboard,
    DashboardAnalyze,
    DashboardHistory,
    Profile,
    Admin,
}

/// Who may see a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Admin,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::About => "/about",
            Route::Services => "/services",
            Route::Contact => "/contact",
            Route::Analyze => "/analyze",
            Route::SignIn => "/login",
            Route::SignUp => "/signup",
            Route::History => "/history",
            Route::Dashboard => "/dashboard",
            Route::DashboardAnalyze => "/dashboard/analyze",
            Route::DashboardHistory => "/dashboard/history",
            Route::Profile => "/dashboard/profile",
            Route::Admin => "/admin",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        ALL_ROUTES.iter().copied().find(|route| route.path() == normalized)
    }

    pub fn access(self) -> Access {
        match self {
            Route::History | Route::DashboardAnalyze | Route::DashboardHistory => Access::Authenticated,
            Route::Admin => Access::Admin,
            // `/dashboard` itself and the profile page render for anonymous users
            // (the profile shows a login prompt).
            _ => Access::Public,
        }
    }
}

const ALL_ROUTES: [Route; 13] = [
    Route::Home,
    Route::About,
    Route::Services,
    Route::Contact,
    Route::Analyze,
    Route::SignIn,
    Route::SignUp,
    Route::History,
    Route::Dashboard,
    Route::DashboardAnalyze,
    Route::DashboardHistory,
    Route::Profile,
    Route::Admin,
];

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Performs navigation on behalf of the core (forced redirects).
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}
