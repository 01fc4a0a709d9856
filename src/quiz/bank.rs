use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument};

use super::models::{Question, QuizBundle, QuizSummary};
use crate::shared::AppError;

const BUNDLED_QUIZZES: &str = include_str!("../../data/quizzes.json");

#[derive(Debug, Error)]
pub enum BankError {
    #[error("Failed to read quiz bank: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed quiz bank: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate quiz id: {0}")]
    DuplicateId(String),

    #[error("Quiz {quiz_id} question {index} points at missing option {answer}")]
    AnswerOutOfRange {
        quiz_id: String,
        index: usize,
        answer: usize,
    },
}

/// Read-only collection of quiz bundles, loaded once at startup
#[derive(Debug, Clone)]
pub struct QuizBank {
    bundles: Vec<QuizBundle>,
}

impl QuizBank {
    /// Builds a bank from already-parsed bundles, validating ids and answer indexes
    pub fn new(bundles: Vec<QuizBundle>) -> Result<Self, BankError> {
        let mut seen = HashSet::new();
        for bundle in &bundles {
            if !seen.insert(bundle.id.as_str()) {
                return Err(BankError::DuplicateId(bundle.id.clone()));
            }
            for (index, question) in bundle.questions.iter().enumerate() {
                if question.answer >= question.options.len() {
                    return Err(BankError::AnswerOutOfRange {
                        quiz_id: bundle.id.clone(),
                        index,
                        answer: question.answer,
                    });
                }
            }
        }

        Ok(Self { bundles })
    }

    pub fn from_json(json: &str) -> Result<Self, BankError> {
        let bundles: Vec<QuizBundle> = serde_json::from_str(json)?;
        Self::new(bundles)
    }

    #[instrument]
    pub fn from_path(path: &Path) -> Result<Self, BankError> {
        let json = std::fs::read_to_string(path)?;
        let bank = Self::from_json(&json)?;
        info!(bundles = bank.len(), "Quiz bank loaded from file");
        Ok(bank)
    }

    /// The corpus shipped with the binary
    pub fn bundled() -> Result<Self, BankError> {
        Self::from_json(BUNDLED_QUIZZES)
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    pub fn bundles(&self) -> &[QuizBundle] {
        &self.bundles
    }

    pub fn find(&self, quiz_id: &str) -> Result<&QuizBundle, AppError> {
        self.bundles
            .iter()
            .find(|bundle| bundle.id == quiz_id)
            .ok_or_else(|| {
                debug!(quiz_id = %quiz_id, "Quiz not found in bank");
                AppError::NotFound("Quiz not found".to_string())
            })
    }

    pub fn summaries(&self) -> Vec<QuizSummary> {
        self.bundles.iter().map(QuizSummary::from).collect()
    }

    /// Every question of every bundle, tagged with its origin
    pub fn question_pool(&self) -> Vec<Question> {
        self.bundles
            .iter()
            .flat_map(|bundle| bundle.questions.iter().map(move |q| q.tagged(bundle)))
            .collect()
    }
}
