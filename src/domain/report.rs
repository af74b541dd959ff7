use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FeedIdentity, MissingField};

/// Candidate element dropped during extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedCandidate {
    /// Position of the candidate in extraction order
    pub position: usize,
    pub field: MissingField,
    pub context: String,
}

/// Outcome class of a run, as seen by the invoking scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Partial,
    NoArticles,
    Failed,
}

impl RunStatus {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunStatus::Success => 0,
            RunStatus::Failed => 1,
            RunStatus::Partial => 2,
            RunStatus::NoArticles => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Partial => "partial",
            RunStatus::NoArticles => "no_articles",
            RunStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub feed: FeedIdentity,
    pub path: PathBuf,
    pub origin: String,
    pub fetched_at: DateTime<Utc>,
    pub candidates: usize,
    pub extracted: usize,
    pub skipped: Vec<SkippedCandidate>,
    pub inferred_dates: usize,
    pub added: usize,
    pub already_seen: usize,
    pub retained: usize,
    pub evicted: usize,
    pub total: usize,
}

impl RunReport {
    pub fn status(&self) -> RunStatus {
        if self.skipped.is_empty() {
            RunStatus::Success
        } else {
            RunStatus::Partial
        }
    }

    /// One-line human summary
    pub fn format(&self) -> String {
        let mut message = format!(
            "{}: {} entries written to {} ({} new, {} known, {} retained",
            self.feed,
            self.total,
            self.path.display(),
            self.added,
            self.already_seen,
            self.retained
        );

        if self.evicted > 0 {
            message.push_str(&format!(", {} evicted", self.evicted));
        }
        message.push(')');

        if !self.skipped.is_empty() {
            message.push_str(&format!("; skipped {} candidates", self.skipped.len()));
        }
        if self.inferred_dates > 0 {
            message.push_str(&format!("; {} inferred dates", self.inferred_dates));
        }

        message
    }
}
