mod flow;
mod form;

pub use flow::{AnalysisFlow, AnalysisOutcome};
pub use form::AnalyzeForm;
