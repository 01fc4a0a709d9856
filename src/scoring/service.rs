use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::calculator::{xp_gained, AttemptRoute};
use crate::quiz::{
    bank::QuizBank,
    models::{QuizAttemptModel, QuizRecord},
    repository::QuizRepository,
};
use crate::shared::AppError;
use crate::user::repository::UserRepository;

/// Outcome of a quiz submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResult {
    pub attempt: QuizAttemptModel,
    pub xp_gained: i64,
}

/// Turns finished sessions into persisted attempts and XP grants
pub struct ScoringService {
    quiz_repository: Arc<dyn QuizRepository + Send + Sync>,
    user_repository: Arc<dyn UserRepository + Send + Sync>,
    bank: Arc<QuizBank>,
}

impl ScoringService {
    pub fn new(
        quiz_repository: Arc<dyn QuizRepository + Send + Sync>,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        bank: Arc<QuizBank>,
    ) -> Self {
        Self {
            quiz_repository,
            user_repository,
            bank,
        }
    }

    /// Makes sure every bank bundle and the virtual global challenge have a quiz record
    #[instrument(skip(self))]
    pub async fn ensure_quiz_records(&self) -> Result<(), AppError> {
        self.quiz_repository
            .ensure_quiz(&QuizRecord::global_challenge())
            .await?;

        for bundle in self.bank.bundles() {
            self.quiz_repository
                .ensure_quiz(&QuizRecord::from(bundle))
                .await?;
        }

        info!(bundles = self.bank.len(), "Quiz records synchronized");
        Ok(())
    }

    /// Records an attempt, then credits XP.
    ///
    /// The attempt survives a failed XP increment: the failure is logged and
    /// the computed result is still returned.
    #[instrument(skip(self))]
    pub async fn submit(
        &self,
        user_id: &str,
        quiz_id: &str,
        score: u8,
    ) -> Result<AttemptResult, AppError> {
        if score > 100 {
            return Err(AppError::Validation(
                "Score must be between 0 and 100".to_string(),
            ));
        }

        let route = AttemptRoute::resolve(quiz_id);
        let reward_base = route.reward_base(&self.bank)?;

        let attempt = QuizAttemptModel::new(
            user_id.to_string(),
            route.store_quiz_id().to_string(),
            score,
        );
        self.quiz_repository.create_attempt(&attempt).await?;

        let xp_gained = xp_gained(score, reward_base);
        info!(
            user_id = %user_id,
            quiz_id = %attempt.quiz_id,
            score = score,
            xp_gained = xp_gained,
            reward_base = reward_base,
            "Processing quiz result"
        );

        match self.user_repository.increment_xp(user_id, xp_gained).await {
            Ok(()) => info!(user_id = %user_id, "XP successfully incremented"),
            Err(e) => warn!(
                user_id = %user_id,
                error = %e,
                "Failed to update user XP, keeping recorded attempt"
            ),
        }

        Ok(AttemptResult { attempt, xp_gained })
    }
}
