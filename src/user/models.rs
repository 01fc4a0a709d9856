use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

const AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/avataaars/svg?seed=";

/// Database model for users table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserModel {
    pub id: String,
    pub username: String,
    pub avatar: String,
    pub xp: i64,
    pub level: i32,
    pub created_at: DateTime<Utc>,
}

impl UserModel {
    /// New user at level 1 with no XP and a generated avatar.
    /// `username` is expected to be trimmed already.
    pub fn new(username: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            avatar: default_avatar(&username),
            username,
            xp: 0,
            level: 1,
            created_at: Utc::now(),
        }
    }
}

pub fn default_avatar(username: &str) -> String {
    format!("{}{}", AVATAR_BASE_URL, username)
}

/// Database model for badges table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeModel {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub awarded_at: DateTime<Utc>,
}

impl BadgeModel {
    pub fn new(user_id: String, name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            name,
            awarded_at: Utc::now(),
        }
    }
}
