//! History record models: the stored row, the insert draft and the display row.

use crate::analysis::{AnalysisResult, Sentiment, format_percent};
use crate::session::UserId;
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of characters kept in a row preview.
pub const PREVIEW_LEN: usize = 50;

/// Backend-assigned record id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(RecordId)
    }
}

/// A persisted analysis result tied to one identity.
///
/// Field names follow the `analysis_history` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: RecordId,
    pub user_id: UserId,
    pub input_text: String,
    pub toxicity_score: f64,
    pub cyberbullying_prob: f64,
    pub result_sarcasm: bool,
    pub sentiment: Sentiment,
    #[serde(rename = "tweet_url", default)]
    pub source_url: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn analysis(&self) -> AnalysisResult {
        AnalysisResult {
            toxicity_score: self.toxicity_score,
            cyberbullying_prob: self.cyberbullying_prob,
            sarcasm: self.result_sarcasm,
            sentiment: self.sentiment,
        }
    }
}

/// Insert payload; the backend assigns `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHistoryRecord {
    pub user_id: UserId,
    pub input_text: String,
    pub toxicity_score: f64,
    pub cyberbullying_prob: f64,
    pub result_sarcasm: bool,
    pub sentiment: Sentiment,
    #[serde(rename = "tweet_url")]
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewHistoryRecord {
    pub fn draft(
        owner: &UserId,
        text: &str,
        result: &AnalysisResult,
        source_url: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: owner.clone(),
            input_text: text.to_string(),
            toxicity_score: result.toxicity_score,
            cyberbullying_prob: result.cyberbullying_prob,
            result_sarcasm: result.sarcasm,
            sentiment: result.sentiment,
            source_url: source_url
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
            created_at,
        }
    }
}

/// Display shape of a history record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub id: RecordId,
    pub owner: UserId,
    /// First [`PREVIEW_LEN`] characters, with `...` appended when truncated.
    pub preview: String,
    pub full_text: String,
    pub toxicity: f64,
    pub cyberbullying: f64,
    pub toxicity_percent: String,
    pub cyberbullying_percent: String,
    pub sarcasm: bool,
    pub sentiment: Sentiment,
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Local date, e.g. `2025-12-02`.
    pub date: String,
    /// Local time, e.g. `10:30`.
    pub time: String,
}

impl HistoryRow {
    pub fn from_record(record: &HistoryRecord) -> Self {
        let local = record.created_at.with_timezone(&Local);
        Self {
            id: record.id,
            owner: record.user_id.clone(),
            preview: preview(&record.input_text),
            full_text: record.input_text.clone(),
            toxicity: record.toxicity_score,
            cyberbullying: record.cyberbullying_prob,
            toxicity_percent: format_percent(record.toxicity_score),
            cyberbullying_percent: format_percent(record.cyberbullying_prob),
            sarcasm: record.result_sarcasm,
            sentiment: record.sentiment,
            source_url: record.source_url.clone(),
            created_at: record.created_at,
            date: local.format("%Y-%m-%d").to_string(),
            time: local.format("%H:%M").to_string(),
        }
    }
}

/// Parses an RFC 3339 timestamp, or a naive ISO timestamp taken as UTC
/// (`timestamp without time zone` columns serialize that way).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_LEN).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
