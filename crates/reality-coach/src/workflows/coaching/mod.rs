//! Adaptive coaching sessions: intake, weighted yes/no questioning, scoring,
//! adaptive stopping, and verdict finalization.
//!
//! Everything here is a pure transformation of the session's answer history;
//! storage, the question catalog, and the career directory sit behind traits
//! so the workflow can be exercised in isolation.

pub mod catalog;
pub mod domain;
pub(crate) mod guidance;
pub mod repository;
pub mod router;
pub(crate) mod scoring;
pub(crate) mod selector;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::{
    load_templates_csv, CareerDirectory, CareerFact, CareerProfile, CatalogError, QuestionCatalog,
    QuestionTemplate, SearchTags, TemplateCsvError,
};
pub use domain::{
    Answer, AnswerId, Bucket, CareerSuggestion, IntakeViolation, Question, QuestionId,
    QuestionSource, SessionId, SessionIntake, SessionRecord, SessionStatus, Verdict,
};
pub use repository::{RepositoryError, SessionProgress, SessionRepository, SessionSnapshot};
pub use router::{coaching_router, SubmitAnswerRequest};
pub use scoring::{
    BucketScores, BucketThresholds, BucketWeights, FitColor, ScoringConfig, ScoringEngine,
    ScoringResult, WeightedAnswer,
};
pub use service::{
    AnswerRecorded, AnswerView, CoachingService, CoachingServiceError, QuestionIssued,
    QuestionView, SessionStarted,
};
