use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{
    bank::QuizBank,
    models::{Question, QuizBundle},
};
use crate::scoring::GENERATED_SESSION_REWARD;
use crate::shared::AppError;

pub const GLOBAL_SESSION_PREFIX: &str = "session-";
pub const JOURNEY_SESSION_PREFIX: &str = "journey-";

pub const GLOBAL_SESSION_TITLE: &str = "Défi Global Otaku";
pub const JOURNEY_SESSION_TITLE: &str = "Parcours Otaku";

pub const GLOBAL_SESSION_SIZE: usize = 30;
pub const JOURNEY_BUNDLE_COUNT: usize = 5;
pub const JOURNEY_QUESTIONS_PER_BUNDLE: usize = 6;

/// One franchise stop of a journey session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapSegment {
    pub quiz_id: String,
    pub title: String,
    pub question_count: usize,
}

/// A playable quiz session; never stored server-side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub title: String,
    pub questions: Vec<Question>,
    pub xp_reward: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roadmap: Option<Vec<RoadmapSegment>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Single,
    Global,
    Journey,
}

impl SessionKind {
    pub fn of(session_id: &str) -> Self {
        if session_id.starts_with(GLOBAL_SESSION_PREFIX) {
            SessionKind::Global
        } else if session_id.starts_with(JOURNEY_SESSION_PREFIX) {
            SessionKind::Journey
        } else {
            SessionKind::Single
        }
    }

    /// Generated sessions have no stable identity of their own
    pub fn is_generated(self) -> bool {
        !matches!(self, SessionKind::Single)
    }
}

impl From<QuizBundle> for Session {
    fn from(bundle: QuizBundle) -> Self {
        Session {
            id: bundle.id,
            title: bundle.title,
            questions: bundle.questions,
            xp_reward: bundle.xp_reward,
            roadmap: None,
        }
    }
}

impl Session {
    pub fn kind(&self) -> SessionKind {
        SessionKind::of(&self.id)
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

/// Builds sessions out of the quiz bank
pub struct SessionEngine<'a> {
    bank: &'a QuizBank,
}

impl<'a> SessionEngine<'a> {
    pub fn new(bank: &'a QuizBank) -> Self {
        Self { bank }
    }

    /// Exactly one bundle, questions in bank order
    pub fn single(&self, quiz_id: &str) -> Result<Session, AppError> {
        let bundle = self.bank.find(quiz_id)?;
        Ok(Session::from(bundle.clone()))
    }

    /// Up to 30 questions drawn uniformly from the whole bank
    #[instrument(skip(self, rng))]
    pub fn global<R: Rng + ?Sized>(&self, rng: &mut R, now_ms: i64) -> Session {
        let mut pool = self.bank.question_pool();
        pool.shuffle(rng);
        pool.truncate(GLOBAL_SESSION_SIZE);

        debug!(questions = pool.len(), "Generated global session");

        Session {
            id: format!("{}{}", GLOBAL_SESSION_PREFIX, now_ms),
            title: GLOBAL_SESSION_TITLE.to_string(),
            questions: pool,
            xp_reward: GENERATED_SESSION_REWARD,
            roadmap: None,
        }
    }

    /// Up to 5 random bundles, up to 6 random questions each, grouped per bundle
    #[instrument(skip(self, rng))]
    pub fn journey<R: Rng + ?Sized>(&self, rng: &mut R, now_ms: i64) -> Session {
        let mut bundles: Vec<_> = self.bank.bundles().iter().collect();
        bundles.shuffle(rng);
        bundles.truncate(JOURNEY_BUNDLE_COUNT);

        let mut questions = Vec::new();
        let mut roadmap = Vec::with_capacity(bundles.len());

        for bundle in bundles {
            let mut picked: Vec<Question> =
                bundle.questions.iter().map(|q| q.tagged(bundle)).collect();
            picked.shuffle(rng);
            picked.truncate(JOURNEY_QUESTIONS_PER_BUNDLE);

            roadmap.push(RoadmapSegment {
                quiz_id: bundle.id.clone(),
                title: bundle.title.clone(),
                question_count: picked.len(),
            });
            questions.extend(picked);
        }

        debug!(
            segments = roadmap.len(),
            questions = questions.len(),
            "Generated journey session"
        );

        Session {
            id: format!("{}{}", JOURNEY_SESSION_PREFIX, now_ms),
            title: JOURNEY_SESSION_TITLE.to_string(),
            questions,
            xp_reward: GENERATED_SESSION_REWARD,
            roadmap: Some(roadmap),
        }
    }
}
