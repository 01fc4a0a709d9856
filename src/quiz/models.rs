use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum_macros::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// Store id of the shared quiz record that every generated session is filed under
pub const GLOBAL_CHALLENGE_ID: &str = "global-challenge";
pub const GLOBAL_CHALLENGE_TITLE: &str = "Défi Global";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Difficulty {
    Facile,
    Moyen,
    Difficile,
    Expert,
}

/// A single multiple-choice question, embedded in a bundle or a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options` of the correct answer
    pub answer: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anime_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_id: Option<String>,
}

impl Question {
    pub fn is_correct(&self, option: usize) -> bool {
        self.answer == option
    }

    /// Copy of this question tagged with the bundle it came from
    pub fn tagged(&self, bundle: &QuizBundle) -> Self {
        Self {
            anime_title: Some(bundle.title.clone()),
            quiz_id: Some(bundle.id.clone()),
            ..self.clone()
        }
    }
}

/// Static quiz unit tied to one anime franchise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizBundle {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub xp_reward: u32,
    pub questions: Vec<Question>,
}

/// List-view projection of a bundle; carries no question bodies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub xp_reward: u32,
    pub question_count: usize,
}

impl From<&QuizBundle> for QuizSummary {
    fn from(bundle: &QuizBundle) -> Self {
        Self {
            id: bundle.id.clone(),
            title: bundle.title.clone(),
            difficulty: bundle.difficulty,
            xp_reward: bundle.xp_reward,
            question_count: bundle.questions.len(),
        }
    }
}

/// Database model for quizzes table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRecord {
    pub id: String,
    pub title: String,
    pub difficulty: Option<String>,
    pub xp_reward: i32,
}

impl QuizRecord {
    /// The virtual record that global and journey attempts point at
    pub fn global_challenge() -> Self {
        Self {
            id: GLOBAL_CHALLENGE_ID.to_string(),
            title: GLOBAL_CHALLENGE_TITLE.to_string(),
            difficulty: None,
            xp_reward: crate::scoring::GENERATED_SESSION_REWARD as i32,
        }
    }
}

impl From<&QuizBundle> for QuizRecord {
    fn from(bundle: &QuizBundle) -> Self {
        Self {
            id: bundle.id.clone(),
            title: bundle.title.clone(),
            difficulty: Some(bundle.difficulty.to_string()),
            xp_reward: bundle.xp_reward as i32,
        }
    }
}

/// Database model for quiz_attempts table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttemptModel {
    pub id: String,
    pub user_id: String,
    pub quiz_id: String,
    pub score: i32,
    pub completed_at: DateTime<Utc>,
}

impl QuizAttemptModel {
    pub fn new(user_id: String, quiz_id: String, score: u8) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            quiz_id,
            score: i32::from(score),
            completed_at: Utc::now(),
        }
    }
}

/// An attempt joined with the quiz it was recorded against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptWithQuiz {
    #[serde(flatten)]
    pub attempt: QuizAttemptModel,
    pub quiz: Option<QuizRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn sample_bundle() -> QuizBundle {
        QuizBundle {
            id: "naruto".to_string(),
            title: "Naruto".to_string(),
            difficulty: Difficulty::Moyen,
            xp_reward: 150,
            questions: vec![Question {
                question: "Quel est le rêve de Naruto ?".to_string(),
                options: vec!["Hokage".to_string(), "Kazekage".to_string()],
                answer: 0,
                anime_title: None,
                quiz_id: None,
            }],
        }
    }

    #[test]
    fn difficulty_round_trips_through_its_label() {
        for difficulty in Difficulty::iter() {
            let label = difficulty.to_string();
            assert_eq!(Difficulty::from_str(&label).unwrap(), difficulty);
        }
    }

    #[test]
    fn tagged_question_carries_bundle_identity() {
        let bundle = sample_bundle();
        let tagged = bundle.questions[0].tagged(&bundle);

        assert_eq!(tagged.anime_title.as_deref(), Some("Naruto"));
        assert_eq!(tagged.quiz_id.as_deref(), Some("naruto"));
        assert_eq!(tagged.question, bundle.questions[0].question);
    }

    #[test]
    fn untagged_question_omits_optional_fields() {
        let bundle = sample_bundle();
        let json = serde_json::to_value(&bundle.questions[0]).unwrap();

        assert!(json.get("animeTitle").is_none());
        assert!(json.get("quizId").is_none());
        assert_eq!(json["answer"], 0);
    }

    #[test]
    fn summary_counts_questions_without_exposing_them() {
        let bundle = sample_bundle();
        let summary = QuizSummary::from(&bundle);
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(summary.question_count, 1);
        assert_eq!(json["xpReward"], 150);
        assert!(json.get("questions").is_none());
    }

    #[test]
    fn global_challenge_record_uses_generated_reward() {
        let record = QuizRecord::global_challenge();
        assert_eq!(record.id, GLOBAL_CHALLENGE_ID);
        assert_eq!(record.xp_reward, 500);
    }
}
