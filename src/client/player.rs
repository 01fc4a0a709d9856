use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use super::api::QuizApi;
use super::progress::{ProgressError, ProgressSnapshot, ProgressStore, ResumableSession};
use crate::quiz::Session;
use crate::scoring::{percentage_score, AttemptResult};
use crate::shared::unix_millis;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error(transparent)]
    Progress(#[from] ProgressError),

    #[error("Session has no questions")]
    EmptySession,

    #[error("Session is already finished")]
    AlreadyFinished,

    #[error("An unfinished session exists; discard it to start another")]
    ConfirmationRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    NotStarted,
    InProgress { step: usize, correct: usize },
    Finished { correct: usize, score: u8 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnswerOutcome {
    Continue {
        was_correct: bool,
        step: usize,
    },
    /// `result` is `None` when the submission failed
    Finished {
        was_correct: bool,
        score: u8,
        result: Option<AttemptResult>,
    },
}

/// Plays one session for one user, keeping the progress slot in sync
pub struct QuizPlayer {
    user_id: String,
    session: Session,
    state: PlayerState,
    api: Arc<dyn QuizApi>,
    store: ProgressStore,
}

impl QuizPlayer {
    fn new(
        user_id: String,
        session: Session,
        state: PlayerState,
        api: Arc<dyn QuizApi>,
        store: ProgressStore,
    ) -> Self {
        Self {
            user_id,
            session,
            state,
            api,
            store,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Index of the question awaiting an answer
    pub fn current_step(&self) -> usize {
        match self.state {
            PlayerState::NotStarted => 0,
            PlayerState::InProgress { step, .. } => step,
            PlayerState::Finished { .. } => self.session.question_count(),
        }
    }

    /// Records the chosen option for the current question
    #[instrument(skip(self), fields(session_id = %self.session.id))]
    pub async fn answer(&mut self, option: usize) -> Result<AnswerOutcome, PlayerError> {
        let total = self.session.question_count();
        if total == 0 {
            return Err(PlayerError::EmptySession);
        }

        let (step, correct) = match self.state {
            PlayerState::NotStarted => (0, 0),
            PlayerState::InProgress { step, correct } => (step, correct),
            PlayerState::Finished { .. } => return Err(PlayerError::AlreadyFinished),
        };

        let question = self
            .session
            .questions
            .get(step)
            .ok_or(PlayerError::AlreadyFinished)?;
        let was_correct = question.is_correct(option);
        let correct = correct + usize::from(was_correct);
        let step = step + 1;

        if step < total {
            self.store
                .write(&ProgressSnapshot {
                    user_id: self.user_id.clone(),
                    session_data: self.session.clone(),
                    current_step: step,
                    score: correct,
                    last_updated: unix_millis(),
                })
                .await?;
            self.state = PlayerState::InProgress { step, correct };
            return Ok(AnswerOutcome::Continue { was_correct, step });
        }

        let score = percentage_score(correct, total);
        self.state = PlayerState::Finished { correct, score };
        let result = self.submit(score).await;
        self.discard_slot().await;

        Ok(AnswerOutcome::Finished {
            was_correct,
            score,
            result,
        })
    }

    /// Quits the session. A partial score is submitted when at least one answer was right.
    #[instrument(skip(self), fields(session_id = %self.session.id))]
    pub async fn abandon(self) -> Option<AttemptResult> {
        let result = match self.state {
            PlayerState::InProgress { correct, .. } if correct > 0 => {
                let score = percentage_score(correct, self.session.question_count());
                self.submit(score).await
            }
            _ => None,
        };
        self.discard_slot().await;
        result
    }

    /// Clears the slot once the session is over; the outcome stands even if this fails
    async fn discard_slot(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear progress slot");
        }
    }

    async fn submit(&self, score: u8) -> Option<AttemptResult> {
        match self
            .api
            .submit_result(&self.user_id, &self.session.id, score)
            .await
        {
            Ok(result) => {
                info!(score = score, xp_gained = result.xp_gained, "Result submitted");
                Some(result)
            }
            Err(e) => {
                error!(score = score, error = %e, "Failed to submit result");
                None
            }
        }
    }
}

/// Entry point for starting or resuming sessions for the signed-in user
pub struct QuizLobby {
    user_id: String,
    api: Arc<dyn QuizApi>,
    store: ProgressStore,
}

impl QuizLobby {
    pub fn new(user_id: impl Into<String>, api: Arc<dyn QuizApi>, store: ProgressStore) -> Self {
        Self {
            user_id: user_id.into(),
            api,
            store,
        }
    }

    pub async fn resumable(&self) -> Result<ResumableSession, PlayerError> {
        Ok(self.store.resumable_for(&self.user_id).await?)
    }

    /// Continues the saved session, if any
    pub async fn resume(&self) -> Result<Option<QuizPlayer>, PlayerError> {
        let ResumableSession::Resumable(snapshot) = self.resumable().await? else {
            return Ok(None);
        };

        let state = PlayerState::InProgress {
            step: snapshot.current_step,
            correct: snapshot.score,
        };
        Ok(Some(QuizPlayer::new(
            self.user_id.clone(),
            snapshot.session_data,
            state,
            Arc::clone(&self.api),
            self.store.clone(),
        )))
    }

    /// Starts `session`. With a saved session around, `discard_saved` must be set.
    pub async fn start(
        &self,
        session: Session,
        discard_saved: bool,
    ) -> Result<QuizPlayer, PlayerError> {
        if self.resumable().await?.is_resumable() {
            if !discard_saved {
                return Err(PlayerError::ConfirmationRequired);
            }
            self.store.clear().await?;
        }

        Ok(QuizPlayer::new(
            self.user_id.clone(),
            session,
            PlayerState::NotStarted,
            Arc::clone(&self.api),
            self.store.clone(),
        ))
    }
}
