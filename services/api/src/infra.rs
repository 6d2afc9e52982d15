use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use reality_coach::error::AppError;
use reality_coach::workflows::coaching::{
    load_templates_csv, Answer, Bucket, CareerDirectory, CareerFact, CareerProfile, CatalogError,
    Question, QuestionCatalog, QuestionTemplate, RepositoryError, ScoringConfig, SearchTags,
    SessionId, SessionRecord, SessionRepository, SessionSnapshot, SessionStatus, Verdict,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug)]
struct StoredSession {
    record: SessionRecord,
    questions: Vec<Question>,
    answers: Vec<Answer>,
    verdict: Option<Verdict>,
}

/// Mutex-guarded map with check-then-insert inside the critical section, so
/// the at-most-one guarantees hold under concurrent requests.
#[derive(Default, Clone)]
pub(crate) struct InMemorySessionRepository {
    sessions: Arc<Mutex<HashMap<SessionId, StoredSession>>>,
}

impl SessionRepository for InMemorySessionRepository {
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
        completed_at: DateTime<Utc>,
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

/// Template source backed by a fixed list, either the built-in seed set or a
/// CSV export loaded at startup.
#[derive(Clone)]
pub(crate) struct SeededQuestionCatalog {
    templates: Vec<QuestionTemplate>,
}

impl SeededQuestionCatalog {
    pub(crate) fn seeded() -> Self {
        Self {
            templates: seed_templates(),
        }
    }

    pub(crate) fn from_csv_path(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path)?;
        let templates = load_templates_csv(file)?;
        Ok(Self { templates })
    }

    pub(crate) fn template_count(&self) -> usize {
        self.templates.len()
    }
}

impl QuestionCatalog for SeededQuestionCatalog {
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

/// Career knowledge backed by the seed corpus: per-state facts plus the
/// alt-career profiles.
#[derive(Clone)]
pub(crate) struct SeededCareerDirectory {
    facts: Vec<CareerFact>,
    profiles: Vec<CareerProfile>,
}

impl SeededCareerDirectory {
    pub(crate) fn seeded() -> Self {
        Self {
            facts: seed_career_facts(),
            profiles: seed_career_profiles(),
        }
    }
}

impl CareerDirectory for SeededCareerDirectory {
    fn fact(&self, state: &str, role: &str) -> Result<Option<CareerFact>, CatalogError> {
        Ok(self
            .facts
            .iter()
            .find(|fact| fact.state == state && fact.role == role)
            .cloned())
    }

    fn search(&self, tags: &SearchTags) -> Result<Vec<CareerProfile>, CatalogError> {
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

pub(crate) fn default_scoring_config() -> ScoringConfig {
    ScoringConfig::standard()
}

fn template(bucket: Bucket, pattern: &str, weight: u8) -> QuestionTemplate {
    QuestionTemplate {
        bucket,
        pattern: pattern.to_string(),
        weight,
        is_active: true,
    }
}

pub(crate) fn seed_templates() -> Vec<QuestionTemplate> {
    vec![
        template(
            Bucket::Personality,
            "When stressed, can you follow protocols precisely rather than improvise?",
            8,
        ),
        template(
            Bucket::Personality,
            "Do you prefer working independently or as part of a team?",
            6,
        ),
        template(
            Bucket::Personality,
            "Are you comfortable making high-stakes decisions quickly?",
            7,
        ),
        template(
            Bucket::Daily,
            "Are you okay with 50-70% of your shift being {routine_task} rather than {exciting_task}?",
            6,
        ),
        template(Bucket::Daily, "Can you handle {physical_demand} on a regular basis?", 5),
        template(Bucket::Daily, "Are you comfortable with {technology_requirement}?", 4),
        template(
            Bucket::Commitment,
            "Are you willing to complete {training_duration} before you can practice in {state}?",
            10,
        ),
        template(
            Bucket::Commitment,
            "Can you commit to {ongoing_requirement} for the duration of your career?",
            8,
        ),
        template(
            Bucket::Commitment,
            "Are you prepared to invest {financial_commitment} in your career development?",
            7,
        ),
        template(Bucket::Lifestyle, "Can you work {schedule_requirement}?", 6),
        template(
            Bucket::Lifestyle,
            "Are you willing to relocate for better opportunities?",
            5,
        ),
        template(Bucket::Lifestyle, "Can you handle {work_life_balance_challenge}?", 4),
        template(Bucket::Entry, "Do you have {prerequisite_requirement}?", 9),
        template(Bucket::Entry, "Are you prepared to start at {entry_level_position}?", 6),
        template(Bucket::Unsexy, "Are you fine with {unpleasant_aspect}?", 5),
        template(
            Bucket::Unsexy,
            "Can you handle {boring_task} as part of your daily routine?",
            4,
        ),
    ]
}

fn fact(
    state: &str,
    role: &str,
    licensing: &str,
    training: &str,
    cost: &str,
    salary: &str,
    links: &[&str],
) -> CareerFact {
    CareerFact {
        state: state.to_string(),
        role: role.to_string(),
        licensing: licensing.to_string(),
        training: training.to_string(),
        cost: cost.to_string(),
        salary: salary.to_string(),
        links: links.iter().map(|link| link.to_string()).collect(),
    }
}

pub(crate) fn seed_career_facts() -> Vec<CareerFact> {
    vec![
        fact(
            "CA",
            "Registered Nurse",
            "California Board of Registered Nursing (BRN). Requires: Associate or Bachelor degree \
             in nursing, NCLEX-RN exam, background check, 30 hours continuing education every 2 \
             years.",
            "2-4 years: Prerequisites (1-2 years) + Nursing program (2 years). Clinical hours: \
             800+ hours.",
            "Prerequisites: $3,000-8,000. Nursing program: $15,000-60,000. Total: $18,000-68,000.",
            "Entry: $70,000-85,000. Median: $95,000-110,000. Experienced: $120,000+",
            &[
                "https://www.rn.ca.gov/",
                "https://www.bls.gov/oes/current/oes291141.htm",
            ],
        ),
        fact(
            "NY",
            "Registered Nurse",
            "New York State Education Department (NYSED). Requires: Associate or Bachelor degree, \
             NCLEX-RN exam, background check, 3 hours infection control training.",
            "2-4 years: Prerequisites (1-2 years) + Nursing program (2 years). Clinical hours: \
             800+ hours.",
            "Prerequisites: $4,000-10,000. Nursing program: $20,000-70,000. Total: $24,000-80,000.",
            "Entry: $75,000-90,000. Median: $100,000-120,000. Experienced: $130,000+",
            &[
                "https://www.op.nysed.gov/prof/nursing/",
                "https://www.bls.gov/oes/current/oes291141.htm",
            ],
        ),
        fact(
            "CA",
            "Real Estate Agent",
            "California Department of Real Estate (DRE). Requires: 135 hours pre-licensing \
             education, background check, DRE exam, fingerprinting.",
            "3-6 months: Pre-licensing courses (135 hours) + exam prep. No degree required.",
            "Pre-licensing: $300-800. Exam fees: $60. License: $245. Total: $605-1,105.",
            "Entry: $30,000-50,000 (commission-based). Median: $60,000-80,000. Top performers: \
             $150,000+",
            &[
                "https://dre.ca.gov/",
                "https://www.bls.gov/oes/current/oes419021.htm",
            ],
        ),
        fact(
            "CA",
            "Licensed Therapist",
            "California Board of Behavioral Sciences (BBS). Requires: Master's degree in \
             counseling/psychology, 3,000 supervised hours, background check, clinical exam.",
            "6-8 years: Bachelor's (4 years) + Master's (2-3 years) + Supervised hours (1-2 \
             years).",
            "Bachelor's: $40,000-120,000. Master's: $30,000-80,000. Supervision: $2,000-5,000. \
             Total: $72,000-205,000.",
            "Entry: $45,000-60,000. Median: $65,000-85,000. Experienced: $90,000+",
            &[
                "https://www.bbs.ca.gov/",
                "https://www.bls.gov/oes/current/oes211013.htm",
            ],
        ),
        fact(
            "CA",
            "Software Engineer",
            "No license required. Optional certifications: AWS, Google Cloud, Microsoft Azure.",
            "4+ years: Computer Science degree or bootcamp (3-12 months) + self-study. Portfolio \
             required.",
            "Degree: $40,000-200,000. Bootcamp: $10,000-20,000. Self-study: $500-2,000.",
            "Entry: $80,000-120,000. Median: $130,000-180,000. Senior: $200,000+",
            &["https://www.bls.gov/oes/current/oes151251.htm"],
        ),
    ]
}

fn profile(title: &str, personality_tags: &[&str], reality_tags: &[&str]) -> CareerProfile {
    CareerProfile {
        title: title.to_string(),
        personality_tags: personality_tags.iter().map(|tag| tag.to_string()).collect(),
        reality_tags: reality_tags.iter().map(|tag| tag.to_string()).collect(),
    }
}

pub(crate) fn seed_career_profiles() -> Vec<CareerProfile> {
    vec![
        profile(
            "Registered Nurse",
            &[
                "conscientious",
                "empathetic",
                "detail-oriented",
                "stress-tolerant",
            ],
            &[
                "charting",
                "medication-administration",
                "patient-assessment",
                "shift-work",
                "physical-demand",
            ],
        ),
        profile(
            "Real Estate Agent",
            &["outgoing", "persistent", "self-motivated", "people-oriented"],
            &[
                "cold-calling",
                "showings",
                "paperwork",
                "irregular-income",
                "weekend-work",
            ],
        ),
        profile(
            "Software Engineer",
            &[
                "analytical",
                "logical",
                "detail-oriented",
                "continuous-learner",
            ],
            &[
                "debugging",
                "code-reviews",
                "meetings",
                "deadline-pressure",
                "sitting-desk-work",
            ],
        ),
        profile(
            "Licensed Therapist",
            &[
                "empathetic",
                "patient",
                "good-listener",
                "emotionally-stable",
            ],
            &[
                "client-sessions",
                "documentation",
                "insurance-billing",
                "emotional-drain",
                "irregular-schedule",
            ],
        ),
        profile(
            "Teacher",
            &[
                "patient",
                "creative",
                "organized",
                "passionate-about-learning",
            ],
            &[
                "lesson-planning",
                "grading",
                "parent-conferences",
                "classroom-management",
                "low-pay",
            ],
        ),
    ]
}

/// Hydrate the catalog from a CSV export when one is configured, otherwise
/// fall back to the built-in seed set.
pub(crate) fn load_catalog(templates_csv: Option<&Path>) -> Result<SeededQuestionCatalog, AppError> {
    match templates_csv {
        Some(path) => SeededQuestionCatalog::from_csv_path(path),
        None => Ok(SeededQuestionCatalog::seeded()),
    }
}
