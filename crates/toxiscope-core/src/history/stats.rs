//! Profile statistics aggregated from a user's history.

use super::model::HistoryRecord;
use super::query::TOXIC_THRESHOLD;
use crate::analysis::Sentiment;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProfileStats {
    pub total: usize,
    pub toxic: usize,
    pub safe: usize,
    pub average_toxicity: f64,
    pub average_cyberbullying: f64,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub last_analyzed_at: Option<DateTime<Utc>>,
}

impl ProfileStats {
    pub fn from_records(records: &[HistoryRecord]) -> Self {
        let mut stats = Self {
            total: records.len(),
            ..Self::default()
        };
        if records.is_empty() {
            return stats;
        }

        let mut toxicity_sum = 0.0;
        let mut cyberbullying_sum = 0.0;
        for record in records {
            toxicity_sum += record.toxicity_score;
            cyberbullying_sum += record.cyberbullying_prob;
            if record.toxicity_score > TOXIC_THRESHOLD || record.cyberbullying_prob > TOXIC_THRESHOLD {
                stats.toxic += 1;
            }
            match record.sentiment {
                Sentiment::Positive => stats.positive += 1,
                Sentiment::Neutral => stats.neutral += 1,
                Sentiment::Negative => stats.negative += 1,
            }
            if stats.last_analyzed_at.is_none_or(|last| record.created_at > last) {
                stats.last_analyzed_at = Some(record.created_at);
            }
        }
        stats.safe = stats.total - stats.toxic;
        stats.average_toxicity = toxicity_sum / stats.total as f64;
        stats.average_cyberbullying = cyberbullying_sum / stats.total as f64;
        stats
    }
}
