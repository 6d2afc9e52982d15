use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use super::catalog::{CareerDirectory, QuestionCatalog};
use super::domain::{
    Answer, AnswerId, Bucket, IntakeViolation, Question, QuestionId, SessionId, SessionIntake,
    SessionRecord, SessionStatus, Verdict,
};
use super::guidance;
use super::repository::{RepositoryError, SessionProgress, SessionRepository, SessionSnapshot};
use super::scoring::{ScoringConfig, ScoringEngine, ScoringResult, WeightedAnswer};
use super::selector::{self, Selection};

/// Service composing the repository, question catalog, career directory, and
/// scoring engine behind the four client-facing operations.
pub struct CoachingService<R, C, D> {
    repository: Arc<R>,
    catalog: Arc<C>,
    directory: Arc<D>,
    engine: Arc<ScoringEngine>,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static QUESTION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static ANSWER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("sess-{id:06}"))
}

fn next_question_id() -> QuestionId {
    let id = QUESTION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    QuestionId(format!("q-{id:06}"))
}

fn next_answer_id() -> AnswerId {
    let id = ANSWER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AnswerId(format!("ans-{id:06}"))
}

impl<R, C, D> CoachingService<R, C, D>
where
    R: SessionRepository + 'static,
    C: QuestionCatalog + 'static,
    D: CareerDirectory + 'static,
{
    pub fn new(
        repository: Arc<R>,
        catalog: Arc<C>,
        directory: Arc<D>,
        config: ScoringConfig,
    ) -> Self {
        Self {
            repository,
            catalog,
            directory,
            engine: Arc::new(ScoringEngine::new(config)),
        }
    }

    /// Open a new active session after validating the intake.
    pub fn start_session(
        &self,
        intake: SessionIntake,
    ) -> Result<SessionStarted, CoachingServiceError> {
        intake.validate()?;

        let record = SessionRecord {
            session_id: next_session_id(),
            intake,
            status: SessionStatus::Active,
            created_at: Utc::now(),
            completed_at: None,
        };

        let stored = self.repository.create_session(record)?;
        Ok(SessionStarted {
            session_id: stored.session_id,
            status: stored.status,
        })
    }

    /// Return the earliest outstanding question, or select and persist a new
    /// one. Rejected with a conflict once the session is completed.
    pub fn next_question(
        &self,
        session_id: &SessionId,
    ) -> Result<QuestionIssued, CoachingServiceError> {
        let snapshot = self.fetch(session_id)?;
        if snapshot.is_completed() {
            return Err(CoachingServiceError::SessionCompleted(session_id.clone()));
        }

        match selector::select_next(&snapshot, self.catalog.as_ref(), self.directory.as_ref()) {
            Selection::Outstanding(question) => {
                let progress = snapshot.progress_for(&question);
                Ok(QuestionIssued {
                    question: QuestionView::from(&question),
                    progress,
                })
            }
            Selection::Draft(draft) => {
                let order = snapshot.questions.len() as u32 + 1;
                let question = Question {
                    question_id: next_question_id(),
                    session_id: session_id.clone(),
                    order,
                    bucket: draft.bucket,
                    text: draft.text,
                    weight: draft.weight,
                    source: draft.source,
                };

                match self.repository.insert_question(question) {
                    Ok(stored) => Ok(QuestionIssued {
                        question: QuestionView::from(&stored),
                        progress: SessionProgress {
                            current: stored.order,
                            total: stored.order,
                        },
                    }),
                    Err(RepositoryError::Conflict) => {
                        // A concurrent call won the order slot; converge on
                        // the winner's question.
                        let snapshot = self.fetch(session_id)?;
                        let question = snapshot
                            .first_unanswered()
                            .cloned()
                            .ok_or(RepositoryError::Conflict)?;
                        let progress = snapshot.progress_for(&question);
                        Ok(QuestionIssued {
                            question: QuestionView::from(&question),
                            progress,
                        })
                    }
                    Err(other) => Err(other.into()),
                }
            }
        }
    }

    /// Record an answer, rescore the session, and complete it when the stop
    /// policy fires.
    pub fn submit_answer(
        &self,
        session_id: &SessionId,
        question_id: &QuestionId,
        value: bool,
        note: Option<String>,
    ) -> Result<AnswerRecorded, CoachingServiceError> {
        let snapshot = self.fetch(session_id)?;
        if snapshot.is_completed() {
            return Err(CoachingServiceError::SessionCompleted(session_id.clone()));
        }

        let question = snapshot
            .question(question_id)
            .cloned()
            .ok_or_else(|| CoachingServiceError::ForeignQuestion {
                session: session_id.clone(),
                question: question_id.clone(),
            })?;
        if snapshot.is_answered(question_id) {
            return Err(CoachingServiceError::DuplicateAnswer(question_id.clone()));
        }

        let answer = Answer {
            answer_id: next_answer_id(),
            session_id: session_id.clone(),
            question_id: question_id.clone(),
            value,
            note,
        };
        let stored = self.repository.insert_answer(answer).map_err(|err| match err {
            RepositoryError::Conflict => {
                CoachingServiceError::DuplicateAnswer(question_id.clone())
            }
            other => CoachingServiceError::Repository(other),
        })?;

        let mut weighted = snapshot.weighted_answers();
        weighted.push(WeightedAnswer {
            bucket: question.bucket,
            weight: question.weight,
            value,
        });
        let scoring = self.engine.score(&weighted);

        if scoring.should_stop {
            self.repository.complete_session(session_id, Utc::now())?;
            info!(
                session = %session_id,
                fit_score = scoring.fit_score,
                reason = scoring.stop_reason.as_deref().unwrap_or(""),
                "coaching session stopped adaptively"
            );
        }

        Ok(AnswerRecorded {
            answer: AnswerView {
                id: stored.answer_id,
                value: stored.value,
                note: stored.note,
            },
            done: scoring.should_stop,
            stop_reason: scoring.stop_reason.clone(),
            scoring,
        })
    }

    /// Finalize and return the session's verdict. Computed once; subsequent
    /// calls return the stored record without recomputation.
    pub fn verdict(&self, session_id: &SessionId) -> Result<Verdict, CoachingServiceError> {
        let snapshot = self.fetch(session_id)?;
        if let Some(verdict) = snapshot.verdict.clone() {
            return Ok(verdict);
        }

        let intake = &snapshot.session.intake;
        let scoring = self.engine.score(&snapshot.weighted_answers());
        let next_steps = guidance::next_steps(&scoring, &intake.state, &intake.target_role);

        // Alt-career search is best effort: a directory failure degrades to
        // an empty suggestion list.
        let tags = guidance::search_tags(&snapshot, &scoring.mismatches);
        let profiles = self.directory.search(&tags).unwrap_or_default();
        let alt_careers =
            guidance::career_suggestions(&profiles, &intake.target_role, &scoring.mismatches);

        let verdict = Verdict {
            session_id: session_id.clone(),
            fit_score: scoring.fit_score,
            color: scoring.color,
            summary: guidance::verdict_summary(&scoring, &intake.target_role),
            bucket_scores: scoring.bucket_scores,
            mismatches: scoring.mismatches,
            next_steps,
            alt_careers,
        };

        let stored = self.repository.store_verdict(verdict)?;
        self.repository.complete_session(session_id, Utc::now())?;
        info!(session = %session_id, fit_score = stored.fit_score, "verdict finalized");
        Ok(stored)
    }

    /// Active templates as exposed on the read-only admin surface.
    pub fn templates(
        &self,
        bucket: Option<Bucket>,
    ) -> Result<Vec<super::catalog::QuestionTemplate>, CoachingServiceError> {
        self.catalog
            .active_templates(bucket)
            .map_err(CoachingServiceError::Catalog)
    }

    fn fetch(&self, session_id: &SessionId) -> Result<SessionSnapshot, CoachingServiceError> {
        self.repository
            .snapshot(session_id)?
            .ok_or_else(|| CoachingServiceError::SessionNotFound(session_id.clone()))
    }
}

/// Response to a successful session start.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStarted {
    pub session_id: SessionId,
    pub status: SessionStatus,
}

/// Public shape of an issued question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub id: QuestionId,
    pub text: String,
    pub bucket: Bucket,
    pub weight: u8,
    pub order: u32,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.question_id.clone(),
            text: question.text.clone(),
            bucket: question.bucket,
            weight: question.weight,
            order: question.order,
        }
    }
}

/// Response to a next-question request.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionIssued {
    pub question: QuestionView,
    pub progress: SessionProgress,
}

/// Echo of a recorded answer.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerView {
    pub id: AnswerId,
    pub value: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Response to an answer submission: the stored answer, the fresh scoring
/// snapshot, and whether the session just completed.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerRecorded {
    pub answer: AnswerView,
    pub scoring: ScoringResult,
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
}

/// Error raised by the coaching service.
#[derive(Debug, thiserror::Error)]
pub enum CoachingServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error("session {0} not found")]
    SessionNotFound(SessionId),
    #[error("session {0} already completed")]
    SessionCompleted(SessionId),
    #[error("question {question} does not belong to session {session}")]
    ForeignQuestion {
        session: SessionId,
        question: QuestionId,
    },
    #[error("question {0} already answered")]
    DuplicateAnswer(QuestionId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Catalog(#[from] super::catalog::CatalogError),
}
