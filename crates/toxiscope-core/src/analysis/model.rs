//! Analysis result returned by the inference endpoint.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// Scores for one submitted text. Immutable once returned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// In `[0, 1]`.
    pub toxicity_score: f64,
    /// In `[0, 1]`.
    pub cyberbullying_prob: f64,
    pub sarcasm: bool,
    pub sentiment: Sentiment,
}

impl AnalysisResult {
    /// Clamps both scores into `[0, 1]`. NaN becomes 0.
    pub fn normalized(mut self) -> Self {
        self.toxicity_score = clamp_unit(self.toxicity_score);
        self.cyberbullying_prob = clamp_unit(self.cyberbullying_prob);
        self
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Colour band used for score display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Low,
    Medium,
    High,
}

impl ScoreBand {
    pub fn of(score: f64) -> Self {
        if score < 0.3 {
            Self::Low
        } else if score < 0.6 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// Score as a percentage with one decimal, e.g. `0.1234` -> `"12.3%"`.
pub fn format_percent(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}
