use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    bank::QuizBank,
    models::{QuizBundle, QuizSummary},
    repository::QuizRepository,
    session::{Session, SessionEngine},
    types::SubmitAttemptRequest,
};
use crate::scoring::{AttemptResult, ScoringService};
use crate::shared::AppError;
use crate::user::repository::UserRepository;

/// Service for quiz browsing, session generation and result submission
pub struct QuizService {
    bank: Arc<QuizBank>,
    quiz_repository: Arc<dyn QuizRepository + Send + Sync>,
    user_repository: Arc<dyn UserRepository + Send + Sync>,
}

impl QuizService {
    pub fn new(
        bank: Arc<QuizBank>,
        quiz_repository: Arc<dyn QuizRepository + Send + Sync>,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self {
            bank,
            quiz_repository,
            user_repository,
        }
    }

    pub fn list_quizzes(&self) -> Vec<QuizSummary> {
        self.bank.summaries()
    }

    pub fn get_quiz(&self, quiz_id: &str) -> Result<QuizBundle, AppError> {
        self.bank.find(quiz_id).cloned()
    }

    pub fn global_session<R: Rng + ?Sized>(&self, rng: &mut R, now_ms: i64) -> Session {
        SessionEngine::new(&self.bank).global(rng, now_ms)
    }

    pub fn journey_session<R: Rng + ?Sized>(&self, rng: &mut R, now_ms: i64) -> Session {
        SessionEngine::new(&self.bank).journey(rng, now_ms)
    }

    #[instrument(skip(self, request), fields(user_id = %request.user_id, quiz_id = %request.quiz_id))]
    pub async fn submit_attempt(
        &self,
        request: SubmitAttemptRequest,
    ) -> Result<AttemptResult, AppError> {
        let user_id = request.user_id.trim();
        let quiz_id = request.quiz_id.trim();
        if user_id.is_empty() || quiz_id.is_empty() {
            return Err(AppError::Validation(
                "User id and quiz id are required".to_string(),
            ));
        }

        let score = u8::try_from(request.score)
            .ok()
            .filter(|score| *score <= 100)
            .ok_or_else(|| {
                AppError::Validation("Score must be between 0 and 100".to_string())
            })?;
        debug!(score = score, "Submitting attempt");

        let scoring = ScoringService::new(
            Arc::clone(&self.quiz_repository),
            Arc::clone(&self.user_repository),
            Arc::clone(&self.bank),
        );
        let result = scoring.submit(user_id, quiz_id, score).await?;

        info!(
            attempt_id = %result.attempt.id,
            xp_gained = result.xp_gained,
            "Attempt submitted"
        );
        Ok(result)
    }
}
