use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::workflows::coaching::catalog::{
    CareerDirectory, CareerFact, CareerProfile, CatalogError, QuestionCatalog, QuestionTemplate,
    SearchTags,
};
use crate::workflows::coaching::domain::{
    Answer, Bucket, Question, QuestionId, QuestionSource, SessionId, SessionIntake, SessionRecord,
    SessionStatus, Verdict,
};
use crate::workflows::coaching::repository::{
    RepositoryError, SessionRepository, SessionSnapshot,
};
use crate::workflows::coaching::scoring::{ScoringConfig, ScoringEngine, WeightedAnswer};
use crate::workflows::coaching::service::CoachingService;

pub(super) fn scoring_config() -> ScoringConfig {
    ScoringConfig::standard()
}

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::new(scoring_config())
}

pub(super) fn weighted(bucket: Bucket, weight: u8, value: bool) -> WeightedAnswer {
    WeightedAnswer {
        bucket,
        weight,
        value,
    }
}

pub(super) fn intake() -> SessionIntake {
    SessionIntake {
        target_role: "Registered Nurse".to_string(),
        state: "CA".to_string(),
        age_range: "25-34".to_string(),
        has_quals: false,
        constraints: "evenings only".to_string(),
    }
}

pub(super) fn session_record(id: &str) -> SessionRecord {
    SessionRecord {
        session_id: SessionId(id.to_string()),
        intake: intake(),
        status: SessionStatus::Active,
        created_at: Utc::now(),
        completed_at: None,
    }
}

pub(super) fn question(
    session: &str,
    id: &str,
    order: u32,
    bucket: Bucket,
    weight: u8,
) -> Question {
    Question {
        question_id: QuestionId(id.to_string()),
        session_id: SessionId(session.to_string()),
        order,
        bucket,
        text: format!("fixture question {order}"),
        weight,
        source: QuestionSource::Generated,
    }
}

pub(super) fn answer(session: &str, question_id: &str, value: bool) -> Answer {
    Answer {
        answer_id: crate::workflows::coaching::domain::AnswerId(format!("ans-{question_id}")),
        session_id: SessionId(session.to_string()),
        question_id: QuestionId(question_id.to_string()),
        value,
        note: None,
    }
}

pub(super) fn snapshot(
    record: SessionRecord,
    questions: Vec<Question>,
    answers: Vec<Answer>,
) -> SessionSnapshot {
    SessionSnapshot {
        session: record,
        questions,
        answers,
        verdict: None,
    }
}

pub(super) fn fixture_templates() -> Vec<QuestionTemplate> {
    vec![
        QuestionTemplate {
            bucket: Bucket::Personality,
            pattern: "When stressed, can you follow protocols precisely rather than improvise?"
                .to_string(),
            weight: 8,
            is_active: true,
        },
        QuestionTemplate {
            bucket: Bucket::Personality,
            pattern: "Are you comfortable making high-stakes decisions quickly?".to_string(),
            weight: 7,
            is_active: true,
        },
        QuestionTemplate {
            bucket: Bucket::Daily,
            pattern:
                "Are you okay with 50-70% of your shift being {routine_task} rather than {exciting_task}?"
                    .to_string(),
            weight: 6,
            is_active: true,
        },
        QuestionTemplate {
            bucket: Bucket::Commitment,
            pattern:
                "Are you willing to complete {training_duration} before you can practice in {state}?"
                    .to_string(),
            weight: 10,
            is_active: true,
        },
        QuestionTemplate {
            bucket: Bucket::Lifestyle,
            pattern: "Can you work {schedule_requirement}?".to_string(),
            weight: 6,
            is_active: true,
        },
        QuestionTemplate {
            bucket: Bucket::Entry,
            pattern: "Do you have {prerequisite_requirement}?".to_string(),
            weight: 9,
            is_active: true,
        },
        QuestionTemplate {
            bucket: Bucket::Unsexy,
            pattern: "Are you fine with {unpleasant_aspect}?".to_string(),
            weight: 5,
            is_active: true,
        },
    ]
}

pub(super) fn fixture_profiles() -> Vec<CareerProfile> {
    vec![
        CareerProfile {
            title: "Medical Coder".to_string(),
            personality_tags: vec!["detail-oriented".to_string(), "analytical".to_string()],
            reality_tags: vec!["administrative".to_string(), "routine".to_string()],
        },
        CareerProfile {
            title: "Health Educator".to_string(),
            personality_tags: vec!["people-oriented".to_string()],
            reality_tags: vec!["flexible-schedule".to_string()],
        },
    ]
}

pub(super) fn fixture_fact() -> CareerFact {
    CareerFact {
        state: "CA".to_string(),
        role: "Registered Nurse".to_string(),
        licensing: "California Board of Registered Nursing (BRN)".to_string(),
        training: "2-4 years including 800+ clinical hours".to_string(),
        cost: "$18,000-68,000".to_string(),
        salary: "Median $95,000-110,000".to_string(),
        links: vec!["https://www.rn.ca.gov/".to_string()],
    }
}

#[derive(Debug)]
pub(super) struct StoredSession {
    pub(super) record: SessionRecord,
    pub(super) questions: Vec<Question>,
    pub(super) answers: Vec<Answer>,
    pub(super) verdict: Option<Verdict>,
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    sessions: Arc<Mutex<HashMap<SessionId, StoredSession>>>,
}

impl MemoryRepository {
    pub(super) fn session_count(&self) -> usize {
        self.sessions.lock().expect("repository mutex poisoned").len()
    }

    pub(super) fn answer_count(&self, id: &SessionId) -> usize {
        self.sessions
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .map(|session| session.answers.len())
            .unwrap_or(0)
    }

    pub(super) fn status_of(&self, id: &SessionId) -> Option<SessionStatus> {
        self.sessions
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .map(|session| session.record.status)
    }
}

impl SessionRepository for MemoryRepository {
    fn create_session(&self, record: SessionRecord) -> Result<SessionRecord, RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.session_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(
            record.session_id.clone(),
            StoredSession {
                record: record.clone(),
                questions: Vec::new(),
                answers: Vec::new(),
                verdict: None,
            },
        );
        Ok(record)
    }

    fn snapshot(&self, id: &SessionId) -> Result<Option<SessionSnapshot>, RepositoryError> {
        let guard = self.sessions.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).map(|session| {
            let mut questions = session.questions.clone();
            questions.sort_by_key(|question| question.order);
            SessionSnapshot {
                session: session.record.clone(),
                questions,
                answers: session.answers.clone(),
                verdict: session.verdict.clone(),
            }
        }))
    }

    fn insert_question(&self, question: Question) -> Result<Question, RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        let session = guard
            .get_mut(&question.session_id)
            .ok_or(RepositoryError::NotFound)?;
        if session
            .questions
            .iter()
            .any(|existing| existing.order == question.order)
        {
            return Err(RepositoryError::Conflict);
        }
        session.questions.push(question.clone());
        Ok(question)
    }

    fn insert_answer(&self, answer: Answer) -> Result<Answer, RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        let session = guard
            .get_mut(&answer.session_id)
            .ok_or(RepositoryError::NotFound)?;
        if session
            .answers
            .iter()
            .any(|existing| existing.question_id == answer.question_id)
        {
            return Err(RepositoryError::Conflict);
        }
        session.answers.push(answer.clone());
        Ok(answer)
    }

    fn complete_session(
        &self,
        id: &SessionId,
        completed_at: chrono::DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        let session = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if session.record.status == SessionStatus::Active {
            session.record.status = SessionStatus::Completed;
            session.record.completed_at = Some(completed_at);
        }
        Ok(())
    }

    fn store_verdict(&self, verdict: Verdict) -> Result<Verdict, RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        let session = guard
            .get_mut(&verdict.session_id)
            .ok_or(RepositoryError::NotFound)?;
        if let Some(existing) = &session.verdict {
            return Ok(existing.clone());
        }
        session.verdict = Some(verdict.clone());
        Ok(verdict)
    }
}

#[derive(Clone)]
pub(super) struct MemoryCatalog {
    templates: Vec<QuestionTemplate>,
}

impl MemoryCatalog {
    pub(super) fn with(templates: Vec<QuestionTemplate>) -> Self {
        Self { templates }
    }

    pub(super) fn seeded() -> Self {
        Self::with(fixture_templates())
    }

    pub(super) fn empty() -> Self {
        Self::with(Vec::new())
    }
}

impl QuestionCatalog for MemoryCatalog {
    fn active_templates(
        &self,
        bucket: Option<Bucket>,
    ) -> Result<Vec<QuestionTemplate>, CatalogError> {
        let mut templates: Vec<QuestionTemplate> = self
            .templates
            .iter()
            .filter(|template| template.is_active)
            .filter(|template| bucket.map(|wanted| template.bucket == wanted).unwrap_or(true))
            .cloned()
            .collect();
        templates.sort_by(|a, b| b.weight.cmp(&a.weight));
        Ok(templates)
    }
}

pub(super) struct FailingCatalog;

impl QuestionCatalog for FailingCatalog {
    fn active_templates(
        &self,
        _bucket: Option<Bucket>,
    ) -> Result<Vec<QuestionTemplate>, CatalogError> {
        Err(CatalogError::Unavailable("catalog offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryDirectory {
    facts: Vec<CareerFact>,
    profiles: Vec<CareerProfile>,
    search_calls: AtomicUsize,
}

impl MemoryDirectory {
    pub(super) fn with(facts: Vec<CareerFact>, profiles: Vec<CareerProfile>) -> Self {
        Self {
            facts,
            profiles,
            search_calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn seeded() -> Self {
        Self::with(vec![fixture_fact()], fixture_profiles())
    }

    pub(super) fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::Relaxed)
    }
}

impl CareerDirectory for MemoryDirectory {
    fn fact(&self, state: &str, role: &str) -> Result<Option<CareerFact>, CatalogError> {
        Ok(self
            .facts
            .iter()
            .find(|fact| fact.state == state && fact.role == role)
            .cloned())
    }

    fn search(&self, tags: &SearchTags) -> Result<Vec<CareerProfile>, CatalogError> {
        self.search_calls.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .profiles
            .iter()
            .filter(|profile| {
                profile
                    .personality_tags
                    .iter()
                    .any(|tag| tags.personality.contains(tag))
                    || profile
                        .reality_tags
                        .iter()
                        .any(|tag| tags.realities.contains(tag))
            })
            .cloned()
            .collect())
    }
}

pub(super) struct FailingDirectory;

impl CareerDirectory for FailingDirectory {
    fn fact(&self, _state: &str, _role: &str) -> Result<Option<CareerFact>, CatalogError> {
        Err(CatalogError::Unavailable("directory offline".to_string()))
    }

    fn search(&self, _tags: &SearchTags) -> Result<Vec<CareerProfile>, CatalogError> {
        Err(CatalogError::Unavailable("directory offline".to_string()))
    }
}

/// Delegates writes to an inner repository but reports every question insert
/// as lost, simulating the losing side of a concurrent next-question race.
pub(super) struct RaceLosingRepository {
    pub(super) inner: MemoryRepository,
}

impl SessionRepository for RaceLosingRepository {
    fn create_session(&self, record: SessionRecord) -> Result<SessionRecord, RepositoryError> {
        self.inner.create_session(record)
    }

    fn snapshot(&self, id: &SessionId) -> Result<Option<SessionSnapshot>, RepositoryError> {
        self.inner.snapshot(id)
    }

    fn insert_question(&self, question: Question) -> Result<Question, RepositoryError> {
        self.inner.insert_question(question)?;
        Err(RepositoryError::Conflict)
    }

    fn insert_answer(&self, answer: Answer) -> Result<Answer, RepositoryError> {
        self.inner.insert_answer(answer)
    }

    fn complete_session(
        &self,
        id: &SessionId,
        completed_at: chrono::DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.inner.complete_session(id, completed_at)
    }

    fn store_verdict(&self, verdict: Verdict) -> Result<Verdict, RepositoryError> {
        self.inner.store_verdict(verdict)
    }
}

pub(super) struct UnavailableRepository;

impl SessionRepository for UnavailableRepository {
    fn create_session(&self, _record: SessionRecord) -> Result<SessionRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn snapshot(&self, _id: &SessionId) -> Result<Option<SessionSnapshot>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_question(&self, _question: Question) -> Result<Question, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_answer(&self, _answer: Answer) -> Result<Answer, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn complete_session(
        &self,
        _id: &SessionId,
        _completed_at: chrono::DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn store_verdict(&self, _verdict: Verdict) -> Result<Verdict, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) type TestService = CoachingService<MemoryRepository, MemoryCatalog, MemoryDirectory>;

pub(super) fn build_service() -> (
    TestService,
    Arc<MemoryRepository>,
    Arc<MemoryCatalog>,
    Arc<MemoryDirectory>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let catalog = Arc::new(MemoryCatalog::seeded());
    let directory = Arc::new(MemoryDirectory::seeded());
    let service = CoachingService::new(
        repository.clone(),
        catalog.clone(),
        directory.clone(),
        scoring_config(),
    );
    (service, repository, catalog, directory)
}

/// Issue the next question and answer it in one step; returns whether the
/// session just completed.
pub(super) fn issue_and_answer(service: &TestService, session_id: &SessionId, value: bool) -> bool {
    let issued = service
        .next_question(session_id)
        .expect("next question available");
    let recorded = service
        .submit_answer(session_id, &issued.question.id, value, None)
        .expect("answer accepted");
    recorded.done
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
