use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    Answer, Bucket, Question, QuestionId, SessionId, SessionRecord, SessionStatus, Verdict,
};
use super::scoring::WeightedAnswer;

/// Immutable read model assembled once per operation. The scoring engine and
/// question selector only ever see this snapshot, never live storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session: SessionRecord,
    /// Ordered by `order` ascending.
    pub questions: Vec<Question>,
    /// In submission order.
    pub answers: Vec<Answer>,
    pub verdict: Option<Verdict>,
}

impl SessionSnapshot {
    pub fn is_completed(&self) -> bool {
        self.session.status == SessionStatus::Completed
    }

    /// The earliest issued question without an answer, if any.
    pub fn first_unanswered(&self) -> Option<&Question> {
        self.questions
            .iter()
            .find(|question| !self.is_answered(&question.question_id))
    }

    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions
            .iter()
            .find(|question| question.question_id == *id)
    }

    pub fn is_answered(&self, id: &QuestionId) -> bool {
        self.answers.iter().any(|answer| answer.question_id == *id)
    }

    /// Buckets with at least one answered question this session.
    pub fn answered_buckets(&self) -> BTreeSet<Bucket> {
        self.answers
            .iter()
            .filter_map(|answer| self.question(&answer.question_id))
            .map(|question| question.bucket)
            .collect()
    }

    /// Answers joined with their question's bucket and weight, in submission
    /// order, ready for the scoring engine.
    pub fn weighted_answers(&self) -> Vec<WeightedAnswer> {
        self.answers
            .iter()
            .filter_map(|answer| {
                self.question(&answer.question_id).map(|question| WeightedAnswer {
                    bucket: question.bucket,
                    weight: question.weight,
                    value: answer.value,
                })
            })
            .collect()
    }

    /// Non-empty notes attached to affirmed personality answers.
    pub fn personality_notes(&self) -> Vec<String> {
        self.answers
            .iter()
            .filter(|answer| answer.value)
            .filter(|answer| {
                self.question(&answer.question_id)
                    .map(|question| question.bucket == Bucket::Personality)
                    .unwrap_or(false)
            })
            .filter_map(|answer| answer.note.clone())
            .filter(|note| !note.trim().is_empty())
            .collect()
    }

    pub fn progress_for(&self, question: &Question) -> SessionProgress {
        SessionProgress {
            current: question.order,
            total: self.questions.len() as u32,
        }
    }
}

/// Position within the questionnaire shown alongside each issued question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub current: u32,
    pub total: u32,
}

/// Storage abstraction so the service can be exercised in isolation.
///
/// Implementations must provide exclusive-creation semantics: at most one
/// question per (session, order), at most one answer per (session, question),
/// at most one verdict per session. `store_verdict` is insert-if-absent and
/// hands a racing loser the winner's stored verdict. `complete_session` is
/// idempotent and preserves the first completion timestamp.
pub trait SessionRepository: Send + Sync {
    fn create_session(&self, record: SessionRecord) -> Result<SessionRecord, RepositoryError>;
    fn snapshot(&self, id: &SessionId) -> Result<Option<SessionSnapshot>, RepositoryError>;
    fn insert_question(&self, question: Question) -> Result<Question, RepositoryError>;
    fn insert_answer(&self, answer: Answer) -> Result<Answer, RepositoryError>;
    fn complete_session(
        &self,
        id: &SessionId,
        completed_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;
    fn store_verdict(&self, verdict: Verdict) -> Result<Verdict, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
