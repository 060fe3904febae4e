//! High-risk advisory signal.
//!
//! A presentation hint for a dismissible banner. It is never stored with the
//! result and never blocks persistence.

use super::model::AnalysisResult;

/// A score strictly above this raises the advisory.
pub const HIGH_RISK_THRESHOLD: f64 = 0.70;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAdvisory {
    pub toxic: bool,
    pub cyberbullying: bool,
    /// The larger of the two scores.
    pub peak_score: f64,
}

impl RiskAdvisory {
    pub fn evaluate(result: &AnalysisResult) -> Option<Self> {
        let toxic = result.toxicity_score > HIGH_RISK_THRESHOLD;
        let cyberbullying = result.cyberbullying_prob > HIGH_RISK_THRESHOLD;
        if !toxic && !cyberbullying {
            return None;
        }
        Some(Self {
            toxic,
            cyberbullying,
            peak_score: result.toxicity_score.max(result.cyberbullying_prob),
        })
    }

    pub fn message(&self) -> &'static str {
        match (self.toxic, self.cyberbullying) {
            (true, true) => "High risk: this text looks both toxic and like cyberbullying.",
            (true, false) => "High risk: this text looks toxic.",
            _ => "High risk: this text looks like cyberbullying.",
        }
    }
}
