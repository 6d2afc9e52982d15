use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::catalog::{CareerDirectory, QuestionCatalog};
use super::domain::{Bucket, QuestionId, SessionId, SessionIntake};
use super::repository::{RepositoryError, SessionRepository};
use super::service::{CoachingService, CoachingServiceError};

/// Router builder exposing the coaching operation set over HTTP.
pub fn coaching_router<R, C, D>(service: Arc<CoachingService<R, C, D>>) -> Router
where
    R: SessionRepository + 'static,
    C: QuestionCatalog + 'static,
    D: CareerDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/coaching/sessions",
            post(start_session_handler::<R, C, D>),
        )
        .route(
            "/api/v1/coaching/sessions/:session_id/next-question",
            post(next_question_handler::<R, C, D>),
        )
        .route(
            "/api/v1/coaching/sessions/:session_id/answers",
            post(submit_answer_handler::<R, C, D>),
        )
        .route(
            "/api/v1/coaching/sessions/:session_id/verdict",
            get(verdict_handler::<R, C, D>),
        )
        .route(
            "/api/v1/coaching/templates",
            get(templates_handler::<R, C, D>),
        )
        .with_state(service)
}

pub(crate) async fn start_session_handler<R, C, D>(
    State(service): State<Arc<CoachingService<R, C, D>>>,
    axum::Json(intake): axum::Json<SessionIntake>,
) -> Response
where
    R: SessionRepository + 'static,
    C: QuestionCatalog + 'static,
    D: CareerDirectory + 'static,
{
    match service.start_session(intake) {
        Ok(started) => (StatusCode::CREATED, axum::Json(started)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn next_question_handler<R, C, D>(
    State(service): State<Arc<CoachingService<R, C, D>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    C: QuestionCatalog + 'static,
    D: CareerDirectory + 'static,
{
    let id = SessionId(session_id);
    match service.next_question(&id) {
        Ok(issued) => (StatusCode::OK, axum::Json(issued)).into_response(),
        Err(error) => error_response(error),
    }
}

/// Body of an answer submission.
#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub question_id: QuestionId,
    pub value: bool,
    #[serde(default)]
    pub note: Option<String>,
}

pub(crate) async fn submit_answer_handler<R, C, D>(
    State(service): State<Arc<CoachingService<R, C, D>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<SubmitAnswerRequest>,
) -> Response
where
    R: SessionRepository + 'static,
    C: QuestionCatalog + 'static,
    D: CareerDirectory + 'static,
{
    let id = SessionId(session_id);
    match service.submit_answer(&id, &request.question_id, request.value, request.note) {
        Ok(recorded) => (StatusCode::OK, axum::Json(recorded)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn verdict_handler<R, C, D>(
    State(service): State<Arc<CoachingService<R, C, D>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    C: QuestionCatalog + 'static,
    D: CareerDirectory + 'static,
{
    let id = SessionId(session_id);
    match service.verdict(&id) {
        Ok(verdict) => (StatusCode::OK, axum::Json(verdict)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TemplatesQuery {
    #[serde(default)]
    bucket: Option<String>,
}

pub(crate) async fn templates_handler<R, C, D>(
    State(service): State<Arc<CoachingService<R, C, D>>>,
    Query(query): Query<TemplatesQuery>,
) -> Response
where
    R: SessionRepository + 'static,
    C: QuestionCatalog + 'static,
    D: CareerDirectory + 'static,
{
    let bucket = match query.bucket.as_deref() {
        None => None,
        Some(raw) => match Bucket::parse(raw) {
            Some(bucket) => Some(bucket),
            None => {
                let payload = json!({ "error": format!("unknown bucket '{raw}'") });
                return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
            }
        },
    };

    match service.templates(bucket) {
        Ok(templates) => (StatusCode::OK, axum::Json(templates)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: CoachingServiceError) -> Response {
    let status = match &error {
        CoachingServiceError::Intake(_)
        | CoachingServiceError::ForeignQuestion { .. }
        | CoachingServiceError::DuplicateAnswer(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CoachingServiceError::SessionNotFound(_)
        | CoachingServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        CoachingServiceError::SessionCompleted(_)
        | CoachingServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        CoachingServiceError::Repository(RepositoryError::Unavailable(_))
        | CoachingServiceError::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
