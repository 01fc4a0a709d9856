// Public API - what other modules can use
pub use handlers::{get_profile, leaderboard, login, update_profile};
pub use models::UserModel;
pub use service::UserService;
pub use types::{LeaderboardEntry, UserProfileResponse};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
