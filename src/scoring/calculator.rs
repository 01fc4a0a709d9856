use crate::quiz::bank::QuizBank;
use crate::quiz::models::GLOBAL_CHALLENGE_ID;
use crate::quiz::session::SessionKind;
use crate::shared::AppError;

use super::GENERATED_SESSION_REWARD;

/// Share of correct answers as a rounded percentage; an empty session counts as one question
pub fn percentage_score(correct: usize, total: usize) -> u8 {
    let total = total.max(1);
    let percent = (correct as f64 / total as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

/// XP earned for a percentage score against a reward base
pub fn xp_gained(score: u8, reward_base: u32) -> i64 {
    (f64::from(score) / 100.0 * f64::from(reward_base)).round() as i64
}

/// Where an attempt is filed in the store, and which reward applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptRoute {
    /// Generated global/journey sessions share the virtual quiz record
    Virtual,
    Bundle(String),
}

impl AttemptRoute {
    pub fn resolve(quiz_id: &str) -> Self {
        if SessionKind::of(quiz_id).is_generated() {
            AttemptRoute::Virtual
        } else {
            AttemptRoute::Bundle(quiz_id.to_string())
        }
    }

    pub fn store_quiz_id(&self) -> &str {
        match self {
            AttemptRoute::Virtual => GLOBAL_CHALLENGE_ID,
            AttemptRoute::Bundle(id) => id,
        }
    }

    /// Fails with NotFound when a bundle route names no bank bundle
    pub fn reward_base(&self, bank: &QuizBank) -> Result<u32, AppError> {
        match self {
            AttemptRoute::Virtual => Ok(GENERATED_SESSION_REWARD),
            AttemptRoute::Bundle(id) => Ok(bank.find(id)?.xp_reward),
        }
    }
}
