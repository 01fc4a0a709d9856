use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, warn};

use crate::quiz::Session;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("Progress slot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Progress snapshot could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Everything needed to pick an unfinished session back up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub user_id: String,
    pub session_data: Session,
    pub current_step: usize,
    /// Correct answers so far
    pub score: usize,
    /// Unix milliseconds of the last write
    pub last_updated: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResumableSession {
    Absent,
    Resumable(ProgressSnapshot),
}

impl ProgressSnapshot {
    /// A snapshot can be resumed only with a question left to answer
    /// and no more correct answers than answered ones.
    pub fn is_consistent(&self) -> bool {
        self.current_step < self.session_data.question_count() && self.score <= self.current_step
    }
}

impl ResumableSession {
    pub fn is_resumable(&self) -> bool {
        matches!(self, ResumableSession::Resumable(_))
    }
}

/// Raw storage holding at most one serialized snapshot
#[async_trait]
pub trait ProgressSlot: Send + Sync {
    async fn load(&self) -> Result<Option<String>, ProgressError>;
    async fn save(&self, raw: &str) -> Result<(), ProgressError>;
    async fn clear(&self) -> Result<(), ProgressError>;
}

#[derive(Default)]
pub struct InMemoryProgressSlot {
    raw: Mutex<Option<String>>,
}

impl InMemoryProgressSlot {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressSlot for InMemoryProgressSlot {
    async fn load(&self) -> Result<Option<String>, ProgressError> {
        Ok(self.raw.lock().unwrap().clone())
    }

    async fn save(&self, raw: &str) -> Result<(), ProgressError> {
        *self.raw.lock().unwrap() = Some(raw.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ProgressError> {
        self.raw.lock().unwrap().take();
        Ok(())
    }
}

/// Slot persisted as a single JSON file
pub struct FileProgressSlot {
    path: PathBuf,
}

impl FileProgressSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ProgressSlot for FileProgressSlot {
    async fn load(&self) -> Result<Option<String>, ProgressError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, raw: &str) -> Result<(), ProgressError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), ProgressError> {
        match tokio::fs::remove_file(&self.path).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Typed access to a progress slot
#[derive(Clone)]
pub struct ProgressStore {
    slot: Arc<dyn ProgressSlot>,
}

impl ProgressStore {
    pub fn new(slot: Arc<dyn ProgressSlot>) -> Self {
        Self { slot }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryProgressSlot::new()))
    }

    /// The stored snapshot if it belongs to `user_id`.
    ///
    /// A snapshot that no longer parses, or that cannot be resumed, is removed
    /// and reported as absent.
    pub async fn resumable_for(&self, user_id: &str) -> Result<ResumableSession, ProgressError> {
        let Some(raw) = self.slot.load().await? else {
            return Ok(ResumableSession::Absent);
        };

        let snapshot = match serde_json::from_str::<ProgressSnapshot>(&raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Discarding corrupt progress snapshot");
                self.slot.clear().await?;
                return Ok(ResumableSession::Absent);
            }
        };

        if snapshot.user_id != user_id {
            debug!(owner = %snapshot.user_id, "Snapshot belongs to another user");
            return Ok(ResumableSession::Absent);
        }

        if !snapshot.is_consistent() {
            warn!(
                session_id = %snapshot.session_data.id,
                current_step = snapshot.current_step,
                score = snapshot.score,
                questions = snapshot.session_data.question_count(),
                "Discarding inconsistent progress snapshot"
            );
            self.slot.clear().await?;
            return Ok(ResumableSession::Absent);
        }

        Ok(ResumableSession::Resumable(snapshot))
    }

    pub async fn write(&self, snapshot: &ProgressSnapshot) -> Result<(), ProgressError> {
        let raw = serde_json::to_string(snapshot)?;
        self.slot.save(&raw).await
    }

    pub async fn clear(&self) -> Result<(), ProgressError> {
        self.slot.clear().await
    }
}
