use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::scoring::{BucketScores, FitColor};

/// Identifier wrapper for coaching sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for questions issued into a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionId(pub String);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for recorded answers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnswerId(pub String);

impl fmt::Display for AnswerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Question categories. The first four are the scored buckets; `Entry` and
/// `Unsexy` feed questioning and deal-breaker detection but not bucket scores.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Personality,
    Daily,
    Commitment,
    Lifestyle,
    Entry,
    Unsexy,
}

impl Bucket {
    /// Selection priority order walked by the question selector.
    pub const PRIORITY: [Bucket; 6] = [
        Bucket::Personality,
        Bucket::Daily,
        Bucket::Commitment,
        Bucket::Lifestyle,
        Bucket::Entry,
        Bucket::Unsexy,
    ];

    /// Buckets that contribute to bucket scores and the overall fit score.
    pub const SCORED: [Bucket; 4] = [
        Bucket::Personality,
        Bucket::Daily,
        Bucket::Commitment,
        Bucket::Lifestyle,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Bucket::Personality => "personality",
            Bucket::Daily => "daily",
            Bucket::Commitment => "commitment",
            Bucket::Lifestyle => "lifestyle",
            Bucket::Entry => "entry",
            Bucket::Unsexy => "unsexy",
        }
    }

    /// Capitalized form used in user-facing mismatch findings.
    pub const fn display_name(self) -> &'static str {
        match self {
            Bucket::Personality => "Personality",
            Bucket::Daily => "Daily",
            Bucket::Commitment => "Commitment",
            Bucket::Lifestyle => "Lifestyle",
            Bucket::Entry => "Entry",
            Bucket::Unsexy => "Unsexy",
        }
    }

    pub fn parse(value: &str) -> Option<Bucket> {
        match value.trim().to_ascii_lowercase().as_str() {
            "personality" => Some(Bucket::Personality),
            "daily" => Some(Bucket::Daily),
            "commitment" => Some(Bucket::Commitment),
            "lifestyle" => Some(Bucket::Lifestyle),
            "entry" => Some(Bucket::Entry),
            "unsexy" => Some(Bucket::Unsexy),
            _ => None,
        }
    }

    pub const fn is_scored(self) -> bool {
        matches!(
            self,
            Bucket::Personality | Bucket::Daily | Bucket::Commitment | Bucket::Lifestyle
        )
    }
}

/// Intake facts collected before the first question is issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIntake {
    pub target_role: String,
    /// Two-letter region code, e.g. "CA".
    pub state: String,
    pub age_range: String,
    pub has_quals: bool,
    #[serde(default)]
    pub constraints: String,
}

/// Validation errors raised during session intake.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IntakeViolation {
    #[error("target role is required")]
    MissingTargetRole,
    #[error("state is required")]
    MissingState,
    #[error("age range is required")]
    MissingAgeRange,
}

impl SessionIntake {
    pub fn validate(&self) -> Result<(), IntakeViolation> {
        if self.target_role.trim().is_empty() {
            return Err(IntakeViolation::MissingTargetRole);
        }
        if self.state.trim().is_empty() {
            return Err(IntakeViolation::MissingState);
        }
        if self.age_range.trim().is_empty() {
            return Err(IntakeViolation::MissingAgeRange);
        }
        Ok(())
    }
}

/// Lifecycle of a coaching session: active until the stop policy fires or a
/// verdict is finalized, completed forever after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

impl SessionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
        }
    }
}

/// Persisted session row: intake plus lifecycle metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: SessionId,
    pub intake: SessionIntake,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// How a question's text came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionSource {
    Catalog,
    Generated,
}

/// A question issued into a session. `order` is 1-based and unique within the
/// owning session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question_id: QuestionId,
    pub session_id: SessionId,
    pub order: u32,
    pub bucket: Bucket,
    pub text: String,
    pub weight: u8,
    pub source: QuestionSource,
}

/// A yes/no answer to one issued question. At most one per (session, question).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub answer_id: AnswerId,
    pub session_id: SessionId,
    pub question_id: QuestionId,
    pub value: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Alternative occupation suggested alongside a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerSuggestion {
    pub title: String,
    pub reason: String,
}

/// The finalized outcome of a session. Created exactly once; later verdict
/// requests return this record unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub session_id: SessionId,
    pub fit_score: u8,
    pub color: FitColor,
    pub summary: String,
    pub bucket_scores: BucketScores,
    pub mismatches: Vec<String>,
    pub next_steps: Vec<String>,
    pub alt_careers: Vec<CareerSuggestion>,
}
