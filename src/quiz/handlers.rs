use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::{QuizBundle, QuizSummary},
    service::QuizService,
    session::Session,
    types::SubmitAttemptRequest,
};
use crate::scoring::AttemptResult;
use crate::shared::{unix_millis, AppError, AppState};

fn quiz_service(state: &AppState) -> QuizService {
    QuizService::new(
        Arc::clone(&state.quiz_bank),
        Arc::clone(&state.quiz_repository),
        Arc::clone(&state.user_repository),
    )
}

/// GET /quizzes
#[instrument(name = "list_quizzes", skip(state))]
pub async fn list_quizzes(State(state): State<AppState>) -> Json<Vec<QuizSummary>> {
    let summaries = quiz_service(&state).list_quizzes();
    info!(quiz_count = summaries.len(), "Quizzes listed");
    Json(summaries)
}

/// GET /quizzes/:id
#[instrument(name = "get_quiz", skip(state))]
pub async fn get_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Result<Json<QuizBundle>, AppError> {
    let bundle = quiz_service(&state).get_quiz(&quiz_id)?;
    Ok(Json(bundle))
}

/// HTTP handler for the global challenge
///
/// GET /quizzes/session
/// Returns up to 30 questions shuffled across every bundle
#[instrument(name = "global_session", skip(state))]
pub async fn global_session(State(state): State<AppState>) -> Json<Session> {
    let session = quiz_service(&state).global_session(&mut rand::rng(), unix_millis());
    info!(
        session_id = %session.id,
        question_count = session.question_count(),
        "Global session generated"
    );
    Json(session)
}

/// HTTP handler for the journey
///
/// GET /quizzes/journey
/// Returns up to 5 franchises with their roadmap
#[instrument(name = "journey_session", skip(state))]
pub async fn journey_session(State(state): State<AppState>) -> Json<Session> {
    let session = quiz_service(&state).journey_session(&mut rand::rng(), unix_millis());
    info!(
        session_id = %session.id,
        question_count = session.question_count(),
        "Journey session generated"
    );
    Json(session)
}

/// POST /quizzes
#[instrument(name = "submit_attempt", skip(state, request))]
pub async fn submit_attempt(
    State(state): State<AppState>,
    Json(request): Json<SubmitAttemptRequest>,
) -> Result<Json<AttemptResult>, AppError> {
    let result = quiz_service(&state).submit_attempt(request).await?;
    Ok(Json(result))
}
