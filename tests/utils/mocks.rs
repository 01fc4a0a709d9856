use async_trait::async_trait;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use otaku_arena::{
    client::{ClientError, InMemoryProgressSlot, ProgressError, ProgressSlot, QuizApi},
    quiz::models::QuizAttemptModel,
    scoring::{xp_gained, AttemptResult},
};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// One recorded call to `submit_result`
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub user_id: String,
    pub quiz_id: String,
    pub score: u8,
}

/// Records submissions instead of calling a server
#[derive(Clone, Default)]
pub struct MockQuizApi {
    submissions: Arc<Mutex<Vec<Submission>>>,
    failing: bool,
}

impl MockQuizApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every submission fails with a 500
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuizApi for MockQuizApi {
    async fn submit_result(
        &self,
        user_id: &str,
        quiz_id: &str,
        score: u8,
    ) -> Result<AttemptResult, ClientError> {
        self.submissions.lock().unwrap().push(Submission {
            user_id: user_id.to_string(),
            quiz_id: quiz_id.to_string(),
            score,
        });

        if self.failing {
            return Err(ClientError::Api {
                status: 500,
                message: "Database error: unavailable".to_string(),
            });
        }

        Ok(AttemptResult {
            attempt: QuizAttemptModel::new(user_id.to_string(), quiz_id.to_string(), score),
            xp_gained: xp_gained(score, 500),
        })
    }
}

/// In-memory slot whose writes and clears can be made to fail
#[derive(Default)]
pub struct FlakySlot {
    inner: InMemoryProgressSlot,
    fail_save: AtomicBool,
    fail_clear: AtomicBool,
}

impl FlakySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    pub fn fail_clears(&self, fail: bool) {
        self.fail_clear.store(fail, Ordering::SeqCst);
    }

    fn read_only() -> ProgressError {
        ProgressError::Io(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "read-only slot",
        ))
    }
}

#[async_trait]
impl ProgressSlot for FlakySlot {
    async fn load(&self) -> Result<Option<String>, ProgressError> {
        self.inner.load().await
    }

    async fn save(&self, raw: &str) -> Result<(), ProgressError> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(Self::read_only());
        }
        self.inner.save(raw).await
    }

    async fn clear(&self) -> Result<(), ProgressError> {
        if self.fail_clear.load(Ordering::SeqCst) {
            return Err(Self::read_only());
        }
        self.inner.clear().await
    }
}
