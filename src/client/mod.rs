//! Client-side state: typed API access, the resumable progress slot, the quiz
//! player and the vote arena.

// Public API - what other modules can use
pub use api::{is_not_found, ClientError, HttpApiClient, QuizApi, VoteApi};
pub use arena::{Matchup, MatchupPool, Side, VoteDispatcher, VoteFailure};
pub use player::{AnswerOutcome, PlayerError, PlayerState, QuizLobby, QuizPlayer};
pub use progress::{
    FileProgressSlot, InMemoryProgressSlot, ProgressError, ProgressSlot, ProgressSnapshot,
    ProgressStore, ResumableSession,
};

// Internal modules
mod api;
mod arena;
mod player;
mod progress;
