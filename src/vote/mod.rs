// Public API - what other modules can use
pub use handlers::{record_vote, top_animes};
pub use service::{VoteService, VOTE_XP_REWARD};
pub use types::{MatchupDetails, RecordVoteRequest};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
mod types;
