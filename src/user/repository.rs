use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::models::{BadgeModel, UserModel};
use crate::shared::AppError;

/// Partial profile edit; `None` leaves the field as is
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub avatar: Option<String>,
}

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository {
    /// Returns the user holding `candidate.username`, inserting `candidate` if nobody does
    async fn find_or_create(&self, candidate: &UserModel) -> Result<UserModel, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError>;
    async fn get_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError>;
    async fn update_profile(
        &self,
        user_id: &str,
        changes: &ProfileChanges,
    ) -> Result<UserModel, AppError>;

    /// Atomically adds `amount` to the user's XP
    async fn increment_xp(&self, user_id: &str, amount: i64) -> Result<(), AppError>;

    /// Users ordered by level then XP, both descending
    async fn leaderboard(&self, limit: usize) -> Result<Vec<UserModel>, AppError>;
    async fn list_badges(&self, user_id: &str) -> Result<Vec<BadgeModel>, AppError>;
}

/// In-memory implementation of UserRepository for development and testing
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, UserModel>>,
    badges: Mutex<Vec<BadgeModel>>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            badges: Mutex::new(Vec::new()),
        }
    }

    /// Inserts a fresh user directly, bypassing login
    pub fn insert_user(&self, username: &str) -> UserModel {
        let user = UserModel::new(username.to_string());
        self.users
            .lock()
            .unwrap()
            .insert(user.id.clone(), user.clone());
        user
    }

    pub fn set_level(&self, user_id: &str, level: i32) {
        if let Some(user) = self.users.lock().unwrap().get_mut(user_id) {
            user.level = level;
        }
    }

    pub fn grant_badge(&self, user_id: &str, name: &str) -> BadgeModel {
        let badge = BadgeModel::new(user_id.to_string(), name.to_string());
        self.badges.lock().unwrap().push(badge.clone());
        badge
    }

    pub fn xp_of(&self, user_id: &str) -> Option<i64> {
        self.users.lock().unwrap().get(user_id).map(|u| u.xp)
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, candidate), fields(username = %candidate.username))]
    async fn find_or_create(&self, candidate: &UserModel) -> Result<UserModel, AppError> {
        let mut users = self.users.lock().unwrap();

        if let Some(existing) = users.values().find(|u| u.username == candidate.username) {
            debug!(user_id = %existing.id, "User found in memory");
            return Ok(existing.clone());
        }

        users.insert(candidate.id.clone(), candidate.clone());
        info!(user_id = %candidate.id, "User created in memory");
        Ok(candidate.clone())
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        Ok(self.users.lock().unwrap().get(user_id).cloned())
    }

    #[instrument(skip(self))]
    async fn update_profile(
        &self,
        user_id: &str,
        changes: &ProfileChanges,
    ) -> Result<UserModel, AppError> {
        let mut users = self.users.lock().unwrap();

        if let Some(username) = &changes.username {
            let taken = users
                .values()
                .any(|u| u.username == *username && u.id != user_id);
            if taken {
                warn!(username = %username, "Username already taken");
                return Err(AppError::Validation("Username already taken".to_string()));
            }
        }

        let user = users.get_mut(user_id).ok_or_else(|| {
            warn!(user_id = %user_id, "User not found for update in memory");
            AppError::NotFound("User not found".to_string())
        })?;

        if let Some(username) = &changes.username {
            user.username = username.clone();
        }
        if let Some(avatar) = &changes.avatar {
            user.avatar = avatar.clone();
        }

        debug!(user_id = %user_id, "User updated in memory");
        Ok(user.clone())
    }

    #[instrument(skip(self))]
    async fn increment_xp(&self, user_id: &str, amount: i64) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(user_id).ok_or_else(|| {
            warn!(user_id = %user_id, "User not found for XP increment in memory");
            AppError::NotFound("User not found".to_string())
        })?;

        user.xp += amount;
        debug!(user_id = %user_id, xp = user.xp, "XP incremented in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn leaderboard(&self, limit: usize) -> Result<Vec<UserModel>, AppError> {
        let mut users: Vec<UserModel> = self.users.lock().unwrap().values().cloned().collect();
        users.sort_by(|a, b| b.level.cmp(&a.level).then(b.xp.cmp(&a.xp)));
        users.truncate(limit);
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn list_badges(&self, user_id: &str) -> Result<Vec<BadgeModel>, AppError> {
        let badges = self.badges.lock().unwrap();
        Ok(badges
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, username, avatar, xp, level, created_at";

fn map_unique_violation(error: sqlx::Error) -> AppError {
    let is_unique = error
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false);

    if is_unique {
        AppError::Validation("Username already taken".to_string())
    } else {
        AppError::from(error)
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, candidate), fields(username = %candidate.username))]
    async fn find_or_create(&self, candidate: &UserModel) -> Result<UserModel, AppError> {
        sqlx::query(
            "INSERT INTO users (id, username, avatar, xp, level, created_at) VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (username) DO NOTHING",
        )
        .bind(&candidate.id)
        .bind(&candidate.username)
        .bind(&candidate.avatar)
        .bind(candidate.xp)
        .bind(candidate.level)
        .bind(candidate.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to insert user");
            AppError::from(e)
        })?;

        self.find_by_username(&candidate.username)
            .await?
            .ok_or_else(|| AppError::DatabaseError("User vanished after insert".to_string()))
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch user by username");
            AppError::from(e)
        })
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        sqlx::query_as::<_, UserModel>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to fetch user");
                AppError::from(e)
            })
    }

    #[instrument(skip(self))]
    async fn update_profile(
        &self,
        user_id: &str,
        changes: &ProfileChanges,
    ) -> Result<UserModel, AppError> {
        sqlx::query_as::<_, UserModel>(&format!(
            "UPDATE users SET username = COALESCE($2, username), avatar = COALESCE($3, avatar) \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(&changes.username)
        .bind(&changes.avatar)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to update user");
            map_unique_violation(e)
        })?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    #[instrument(skip(self))]
    async fn increment_xp(&self, user_id: &str, amount: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET xp = xp + $2 WHERE id = $1")
            .bind(user_id)
            .bind(amount)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to increment XP");
                AppError::from(e)
            })?;

        if result.rows_affected() == 0 {
            warn!(user_id = %user_id, "User not found for XP increment");
            return Err(AppError::NotFound("User not found".to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn leaderboard(&self, limit: usize) -> Result<Vec<UserModel>, AppError> {
        sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {} FROM users ORDER BY level DESC, xp DESC LIMIT $1",
            USER_COLUMNS
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch leaderboard");
            AppError::from(e)
        })
    }

    #[instrument(skip(self))]
    async fn list_badges(&self, user_id: &str) -> Result<Vec<BadgeModel>, AppError> {
        sqlx::query_as::<_, BadgeModel>(
            "SELECT id, user_id, name, awarded_at FROM badges WHERE user_id = $1 ORDER BY awarded_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch badges");
            AppError::from(e)
        })
    }
}
