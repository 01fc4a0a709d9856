// Public API - what other modules can use
pub use calculator::{percentage_score, xp_gained, AttemptRoute};
pub use expertise::{calculate_expertise, ExpertiseAxis, Genre};
pub use progression::{level_progress_percent, prestige_title, xp_to_next_level, LevelProgress};
pub use service::{AttemptResult, ScoringService};

/// Reward base for every generated (global or journey) session
pub const GENERATED_SESSION_REWARD: u32 = 500;

// Internal modules
pub mod calculator;
pub mod expertise;
pub mod progression;
mod service;
