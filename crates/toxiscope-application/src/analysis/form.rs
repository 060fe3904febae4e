//! State behind the analyze page: input, last result, advisory banner and
//! the save button.

use super::flow::{AnalysisFlow, AnalysisOutcome};
use crate::view_scope::ViewScope;
use std::sync::{Arc, Mutex, MutexGuard};
use toxiscope_core::analysis::{RiskAdvisory, SaveGate};
use toxiscope_core::history::HistoryRecord;
use toxiscope_core::{ClientError, ClientResult};

#[derive(Debug, Default)]
struct FormState {
    text: String,
    source_url: Option<String>,
    outcome: Option<AnalysisOutcome>,
    advisory_dismissed: bool,
    gate: SaveGate,
}

pub struct AnalyzeForm {
    flow: Arc<AnalysisFlow>,
    scope: ViewScope,
    state: Mutex<FormState>,
}

impl AnalyzeForm {
    pub fn new(flow: Arc<AnalysisFlow>, scope: ViewScope) -> Self {
        Self {
            flow,
            scope,
            state: Mutex::new(FormState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_text(&self, text: impl Into<String>) {
        let mut state = self.lock();
        state.text = text.into();
        let text = state.text.clone();
        state.gate.text_changed(&text);
    }

    pub fn set_source_url(&self, url: Option<String>) {
        self.lock().source_url = url;
    }

    pub fn text(&self) -> String {
        self.lock().text.clone()
    }

    /// Analyzes the current input.
    ///
    /// A result that comes back after the input was edited, or after the view
    /// was torn down, is returned but not shown.
    pub async fn analyze(&self) -> ClientResult<AnalysisOutcome> {
        let text = self.text();
        let outcome = self.flow.analyze(&text).await?;
        if !self.scope.is_active() {
            return Ok(outcome);
        }

        let mut state = self.lock();
        if state.text == text {
            state.outcome = Some(outcome);
            state.advisory_dismissed = false;
            state.gate.analyzed(&text);
        }
        Ok(outcome)
    }

    /// Saves the shown result.
    ///
    /// Refused while nothing is analyzed, while a save is in flight, or after a
    /// successful save until the text changes.
    pub async fn save(&self) -> ClientResult<HistoryRecord> {
        let (text, outcome, source_url) = {
            let mut state = self.lock();
            let Some(outcome) = state.outcome else {
                return Err(ClientError::validation("Analyze the text before saving"));
            };
            if !state.gate.begin_save() {
                return Err(ClientError::validation("This result is already saved"));
            }
            (state.text.clone(), outcome, state.source_url.clone())
        };

        let saved = self.flow.save_result(&text, &outcome.result, source_url).await;

        if self.scope.is_active() {
            let mut state = self.lock();
            match &saved {
                Ok(_) => state.gate.save_succeeded(),
                Err(_) => state.gate.save_failed(),
            }
        }
        saved
    }

    pub fn outcome(&self) -> Option<AnalysisOutcome> {
        self.lock().outcome
    }

    /// The banner to show, if any.
    pub fn visible_advisory(&self) -> Option<RiskAdvisory> {
        let state = self.lock();
        if state.advisory_dismissed {
            return None;
        }
        state.outcome.and_then(|outcome| outcome.advisory)
    }

    /// Hides the banner for the current result only.
    pub fn dismiss_advisory(&self) {
        self.lock().advisory_dismissed = true;
    }

    pub fn can_save(&self) -> bool {
        self.lock().gate.can_save()
    }

    pub fn is_saved(&self) -> bool {
        self.lock().gate.is_saved()
    }

    pub fn teardown(&self) {
        self.scope.teardown();
    }
}
