use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{AttemptWithQuiz, QuizAttemptModel, QuizRecord};
use crate::shared::AppError;

/// Trait for quiz and quiz attempt persistence
#[async_trait]
pub trait QuizRepository {
    /// Creates the quiz record if absent; an existing record is left untouched
    async fn ensure_quiz(&self, quiz: &QuizRecord) -> Result<QuizRecord, AppError>;
    async fn get_quiz(&self, quiz_id: &str) -> Result<Option<QuizRecord>, AppError>;
    async fn create_attempt(&self, attempt: &QuizAttemptModel) -> Result<(), AppError>;
    /// Most recent attempts first
    async fn recent_attempts(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<AttemptWithQuiz>, AppError>;
    async fn count_attempts(&self, user_id: &str) -> Result<i64, AppError>;
}

/// In-memory implementation of QuizRepository for development and testing
pub struct InMemoryQuizRepository {
    quizzes: Mutex<HashMap<String, QuizRecord>>,
    attempts: Mutex<Vec<QuizAttemptModel>>,
}

impl Default for InMemoryQuizRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryQuizRepository {
    pub fn new() -> Self {
        Self {
            quizzes: Mutex::new(HashMap::new()),
            attempts: Mutex::new(Vec::new()),
        }
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    pub fn quiz_count(&self) -> usize {
        self.quizzes.lock().unwrap().len()
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    #[instrument(skip(self, quiz), fields(quiz_id = %quiz.id))]
    async fn ensure_quiz(&self, quiz: &QuizRecord) -> Result<QuizRecord, AppError> {
        let mut quizzes = self.quizzes.lock().unwrap();
        let stored = quizzes
            .entry(quiz.id.clone())
            .or_insert_with(|| {
                debug!("Creating quiz record in memory");
                quiz.clone()
            })
            .clone();
        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn get_quiz(&self, quiz_id: &str) -> Result<Option<QuizRecord>, AppError> {
        Ok(self.quizzes.lock().unwrap().get(quiz_id).cloned())
    }

    #[instrument(skip(self, attempt), fields(attempt_id = %attempt.id))]
    async fn create_attempt(&self, attempt: &QuizAttemptModel) -> Result<(), AppError> {
        debug!(user_id = %attempt.user_id, quiz_id = %attempt.quiz_id, "Recording attempt in memory");
        self.attempts.lock().unwrap().push(attempt.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn recent_attempts(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<AttemptWithQuiz>, AppError> {
        let mut attempts: Vec<QuizAttemptModel> = self
            .attempts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal timestamps; reverse after for newest first
        attempts.sort_by_key(|a| a.completed_at);
        attempts.reverse();
        attempts.truncate(limit);

        let quizzes = self.quizzes.lock().unwrap();
        Ok(attempts
            .into_iter()
            .map(|attempt| AttemptWithQuiz {
                quiz: quizzes.get(&attempt.quiz_id).cloned(),
                attempt,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn count_attempts(&self, user_id: &str) -> Result<i64, AppError> {
        let attempts = self.attempts.lock().unwrap();
        Ok(attempts.iter().filter(|a| a.user_id == user_id).count() as i64)
    }
}

/// PostgreSQL implementation of quiz repository
pub struct PostgresQuizRepository {
    pool: PgPool,
}

impl PostgresQuizRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AttemptRow {
    id: String,
    user_id: String,
    quiz_id: String,
    score: i32,
    completed_at: chrono::DateTime<chrono::Utc>,
    quiz_title: Option<String>,
    quiz_difficulty: Option<String>,
    quiz_xp_reward: Option<i32>,
}

impl From<AttemptRow> for AttemptWithQuiz {
    fn from(row: AttemptRow) -> Self {
        let quiz = match (row.quiz_title, row.quiz_xp_reward) {
            (Some(title), Some(xp_reward)) => Some(QuizRecord {
                id: row.quiz_id.clone(),
                title,
                difficulty: row.quiz_difficulty,
                xp_reward,
            }),
            _ => None,
        };

        AttemptWithQuiz {
            attempt: QuizAttemptModel {
                id: row.id,
                user_id: row.user_id,
                quiz_id: row.quiz_id,
                score: row.score,
                completed_at: row.completed_at,
            },
            quiz,
        }
    }
}

#[async_trait]
impl QuizRepository for PostgresQuizRepository {
    #[instrument(skip(self, quiz), fields(quiz_id = %quiz.id))]
    async fn ensure_quiz(&self, quiz: &QuizRecord) -> Result<QuizRecord, AppError> {
        sqlx::query(
            "INSERT INTO quizzes (id, title, difficulty, xp_reward) VALUES ($1, $2, $3, $4) ON CONFLICT (id) DO NOTHING",
        )
        .bind(&quiz.id)
        .bind(&quiz.title)
        .bind(&quiz.difficulty)
        .bind(quiz.xp_reward)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to ensure quiz record");
            AppError::from(e)
        })?;

        self.get_quiz(&quiz.id)
            .await?
            .ok_or_else(|| AppError::DatabaseError("Quiz vanished after upsert".to_string()))
    }

    #[instrument(skip(self))]
    async fn get_quiz(&self, quiz_id: &str) -> Result<Option<QuizRecord>, AppError> {
        sqlx::query_as::<_, QuizRecord>(
            "SELECT id, title, difficulty, xp_reward FROM quizzes WHERE id = $1",
        )
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch quiz record");
            AppError::from(e)
        })
    }

    #[instrument(skip(self, attempt), fields(attempt_id = %attempt.id))]
    async fn create_attempt(&self, attempt: &QuizAttemptModel) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO quiz_attempts (id, user_id, quiz_id, score, completed_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&attempt.id)
        .bind(&attempt.user_id)
        .bind(&attempt.quiz_id)
        .bind(attempt.score)
        .bind(attempt.completed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to record quiz attempt");
            AppError::from(e)
        })?;

        debug!("Quiz attempt recorded in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn recent_attempts(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<AttemptWithQuiz>, AppError> {
        let rows = sqlx::query_as::<_, AttemptRow>(
            "SELECT a.id, a.user_id, a.quiz_id, a.score, a.completed_at, \
                    q.title AS quiz_title, q.difficulty AS quiz_difficulty, q.xp_reward AS quiz_xp_reward \
             FROM quiz_attempts a LEFT JOIN quizzes q ON q.id = a.quiz_id \
             WHERE a.user_id = $1 ORDER BY a.completed_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch recent attempts");
            AppError::from(e)
        })?;

        Ok(rows.into_iter().map(AttemptWithQuiz::from).collect())
    }

    #[instrument(skip(self))]
    async fn count_attempts(&self, user_id: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quiz_attempts WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to count attempts");
                AppError::from(e)
            })?;
        Ok(count)
    }
}
