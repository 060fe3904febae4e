pub mod account;
pub mod admin;
pub mod analyze;
pub mod history;

use anyhow::{Context, Result};
use std::io::Write;
use toxiscope_core::analysis::{ScoreBand, format_percent};

/// Uses `provided` if present, otherwise prompts on stderr and reads a line from stdin.
pub fn read_secret(provided: Option<String>, prompt: &str) -> Result<String> {
    if let Some(value) = provided {
        return Ok(value);
    }
    eprint!("{}: ", prompt);
    std::io::stderr().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line).context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// `"12.3% (low)"`
pub fn score_label(score: f64) -> String {
    let band = match ScoreBand::of(score) {
        ScoreBand::Low => "low",
        ScoreBand::Medium => "medium",
        ScoreBand::High => "high",
    };
    format!("{} ({})", format_percent(score), band)
}
