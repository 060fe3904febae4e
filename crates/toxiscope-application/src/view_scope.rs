use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Lifetime of one view.
///
/// Async view operations keep running after teardown (nothing is aborted
/// mid-request), but their results must not be applied once the scope is gone.
#[derive(Debug, Clone, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope torn down together with this one, or on its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn teardown(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Awaits `fut` and hands back its output only if the scope is still active.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        let output = fut.await;
        self.is_active().then_some(output)
    }
}
