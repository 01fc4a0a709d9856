use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::quiz::{bank::QuizBank, repository::QuizRepository};
use crate::user::repository::UserRepository;
use crate::vote::repository::VoteRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub vote_repository: Arc<dyn VoteRepository + Send + Sync>,
    pub quiz_repository: Arc<dyn QuizRepository + Send + Sync>,
    pub quiz_bank: Arc<QuizBank>,
}

impl AppState {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        vote_repository: Arc<dyn VoteRepository + Send + Sync>,
        quiz_repository: Arc<dyn QuizRepository + Send + Sync>,
        quiz_bank: Arc<QuizBank>,
    ) -> Self {
        Self {
            user_repository,
            vote_repository,
            quiz_repository,
            quiz_bank,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        AppError::DatabaseError(error.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Milliseconds since the Unix epoch, used for session ids and snapshots
pub fn unix_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::quiz::repository::InMemoryQuizRepository;
    use crate::user::repository::InMemoryUserRepository;
    use crate::vote::repository::InMemoryVoteRepository;

    /// Builder for creating AppState with overrides for testing
    pub struct AppStateBuilder {
        user_repository: Option<Arc<dyn UserRepository + Send + Sync>>,
        vote_repository: Option<Arc<dyn VoteRepository + Send + Sync>>,
        quiz_repository: Option<Arc<dyn QuizRepository + Send + Sync>>,
        quiz_bank: Option<Arc<QuizBank>>,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self {
                user_repository: None,
                vote_repository: None,
                quiz_repository: None,
                quiz_bank: None,
            }
        }

        pub fn with_user_repository(
            mut self,
            repo: Arc<dyn UserRepository + Send + Sync>,
        ) -> Self {
            self.user_repository = Some(repo);
            self
        }

        pub fn with_vote_repository(
            mut self,
            repo: Arc<dyn VoteRepository + Send + Sync>,
        ) -> Self {
            self.vote_repository = Some(repo);
            self
        }

        pub fn with_quiz_repository(
            mut self,
            repo: Arc<dyn QuizRepository + Send + Sync>,
        ) -> Self {
            self.quiz_repository = Some(repo);
            self
        }

        pub fn with_quiz_bank(mut self, bank: QuizBank) -> Self {
            self.quiz_bank = Some(Arc::new(bank));
            self
        }

        pub fn build(self) -> AppState {
            AppState {
                user_repository: self
                    .user_repository
                    .unwrap_or_else(|| Arc::new(InMemoryUserRepository::new())),
                vote_repository: self
                    .vote_repository
                    .unwrap_or_else(|| Arc::new(InMemoryVoteRepository::new())),
                quiz_repository: self
                    .quiz_repository
                    .unwrap_or_else(|| Arc::new(InMemoryQuizRepository::new())),
                quiz_bank: self.quiz_bank.unwrap_or_else(|| {
                    Arc::new(QuizBank::bundled().expect("bundled quiz bank should parse"))
                }),
            }
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}
