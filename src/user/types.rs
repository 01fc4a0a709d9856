use serde::{Deserialize, Serialize};

use super::models::{BadgeModel, UserModel};
use crate::quiz::models::AttemptWithQuiz;
use crate::scoring::{ExpertiseAxis, LevelProgress};
use crate::vote::models::VoteWithAnime;

/// Request payload for login-by-name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Derived numbers shown next to a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progression {
    #[serde(flatten)]
    pub level: LevelProgress,
    pub expertise: Vec<ExpertiseAxis>,
}

/// Response for GET /users/:id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    #[serde(flatten)]
    pub user: UserModel,
    pub votes: Vec<VoteWithAnime>,
    pub quiz_attempts: Vec<AttemptWithQuiz>,
    pub badges: Vec<BadgeModel>,
    pub progression: Progression,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCount {
    pub votes: i64,
    pub quiz_attempts: i64,
}

/// One leaderboard row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(flatten)]
    pub user: UserModel,
    #[serde(rename = "_count")]
    pub count: ActivityCount,
}
