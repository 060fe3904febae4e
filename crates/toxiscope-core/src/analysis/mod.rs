//! Analysis domain module.
//!
//! - `model`: `AnalysisResult`, `Sentiment`, score presentation helpers
//! - `advisory`: the high-risk advisory rule
//! - `save_gate`: the save-button policy

mod advisory;
mod model;
mod save_gate;

pub use advisory::{HIGH_RISK_THRESHOLD, RiskAdvisory};
pub use model::{AnalysisResult, ScoreBand, Sentiment, format_percent};
pub use save_gate::SaveGate;

use crate::error::BackendError;
use async_trait::async_trait;

/// The stateless inference endpoint. No session required.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<AnalysisResult, BackendError>;
}
