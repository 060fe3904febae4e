//! Save-button policy.
//!
//! Saving is not idempotent: every save creates a new history row. After a
//! successful save the action stays disabled until the analyzed text changes.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveGate {
    analyzed_text: Option<String>,
    saved_text: Option<String>,
    in_flight: bool,
}

impl SaveGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `text` now has a result on screen.
    pub fn analyzed(&mut self, text: &str) {
        self.analyzed_text = Some(text.to_string());
        if self.saved_text.as_deref() != Some(text) {
            self.saved_text = None;
        }
    }

    /// The input changed; a result for older text can no longer be saved.
    pub fn text_changed(&mut self, text: &str) {
        if self.analyzed_text.as_deref() != Some(text) {
            self.analyzed_text = None;
            self.saved_text = None;
        }
    }

    pub fn begin_save(&mut self) -> bool {
        if !self.can_save() {
            return false;
        }
        self.in_flight = true;
        true
    }

    pub fn save_succeeded(&mut self) {
        self.in_flight = false;
        self.saved_text = self.analyzed_text.clone();
    }

    pub fn save_failed(&mut self) {
        self.in_flight = false;
    }

    pub fn can_save(&self) -> bool {
        !self.in_flight && self.analyzed_text.is_some() && self.saved_text.is_none()
    }

    pub fn is_saved(&self) -> bool {
        self.saved_text.is_some()
    }
}
