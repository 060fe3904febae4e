use toxiscope_core::route::{Navigator, Route};

/// Terminal stand-in for the router: a forced sign-in becomes a notice.
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: Route) {
        match route {
            Route::SignIn => eprintln!("Your session expired, run `toxiscope login` to sign in again."),
            other => tracing::debug!(route = %other, "No terminal equivalent for route"),
        }
    }
}
