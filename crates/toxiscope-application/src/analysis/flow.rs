use crate::session_store::SessionStore;
use chrono::Utc;
use std::sync::Arc;
use toxiscope_core::analysis::{AnalysisResult, InferenceBackend, RiskAdvisory};
use toxiscope_core::history::{HistoryRecord, NewHistoryRecord, RecordStore};
use toxiscope_core::{ClientError, ClientResult};

/// A successful analysis plus the presentation-only high-risk advisory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    pub advisory: Option<RiskAdvisory>,
}

impl AnalysisOutcome {
    pub fn new(result: AnalysisResult) -> Self {
        Self {
            result,
            advisory: RiskAdvisory::evaluate(&result),
        }
    }
}

/// Submit text, get scores, optionally persist them.
pub struct AnalysisFlow {
    inference: Arc<dyn InferenceBackend>,
    records: Arc<dyn RecordStore>,
    session: Arc<SessionStore>,
}

impl AnalysisFlow {
    pub fn new(inference: Arc<dyn InferenceBackend>, records: Arc<dyn RecordStore>, session: Arc<SessionStore>) -> Self {
        Self {
            inference,
            records,
            session,
        }
    }

    /// Scores `text`. Needs no session.
    ///
    /// # Returns
    ///
    /// - `Err(ClientError::Validation)`: `text` is empty or whitespace; nothing was sent
    /// - `Err(ClientError::Failed)`: the inference service failed or timed out
    pub async fn analyze(&self, text: &str) -> ClientResult<AnalysisOutcome> {
        if text.trim().is_empty() {
            return Err(ClientError::validation("Please enter some text to analyze"));
        }

        let result = self.inference.analyze(text).await?;
        let outcome = AnalysisOutcome::new(result);
        tracing::debug!(
            toxicity = result.toxicity_score,
            cyberbullying = result.cyberbullying_prob,
            advisory = outcome.advisory.is_some(),
            "Analysis completed"
        );
        Ok(outcome)
    }

    /// Persists `result` as a new history record owned by the caller.
    ///
    /// Every call creates a new record. Without a live session this returns
    /// [`ClientError::Unauthenticated`] and makes no request.
    pub async fn save_result(
        &self,
        text: &str,
        result: &AnalysisResult,
        source_url: Option<String>,
    ) -> ClientResult<HistoryRecord> {
        let owner = self
            .session
            .identity()
            .map(|identity| identity.id)
            .ok_or(ClientError::Unauthenticated)?;
        if text.trim().is_empty() {
            return Err(ClientError::validation("Nothing to save"));
        }

        let draft = NewHistoryRecord::draft(&owner, text, result, source_url, Utc::now());
        let record = self.records.insert(&draft).await?;
        tracing::info!(user_id = %owner, record_id = %record.id, "Saved analysis to history");
        Ok(record)
    }
}
