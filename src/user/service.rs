use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    models::UserModel,
    repository::{ProfileChanges, UserRepository},
    types::{ActivityCount, LeaderboardEntry, Progression, UpdateProfileRequest, UserProfileResponse},
};
use crate::quiz::repository::QuizRepository;
use crate::scoring::{calculate_expertise, LevelProgress};
use crate::shared::AppError;
use crate::vote::repository::VoteRepository;

/// Number of votes and attempts embedded in a profile
pub const PROFILE_HISTORY_LIMIT: usize = 5;
pub const LEADERBOARD_LIMIT: usize = 20;

/// Service for identity, profiles and the leaderboard
pub struct UserService {
    user_repository: Arc<dyn UserRepository + Send + Sync>,
    vote_repository: Arc<dyn VoteRepository + Send + Sync>,
    quiz_repository: Arc<dyn QuizRepository + Send + Sync>,
}

impl UserService {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        vote_repository: Arc<dyn VoteRepository + Send + Sync>,
        quiz_repository: Arc<dyn QuizRepository + Send + Sync>,
    ) -> Self {
        Self {
            user_repository,
            vote_repository,
            quiz_repository,
        }
    }

    /// Find-or-create by trimmed username
    #[instrument(skip(self))]
    pub async fn login(&self, username: &str) -> Result<UserModel, AppError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::Validation("Username is required".to_string()));
        }

        let user = self
            .user_repository
            .find_or_create(&UserModel::new(username.to_string()))
            .await?;

        info!(user_id = %user.id, username = %user.username, "User logged in");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: &str) -> Result<UserProfileResponse, AppError> {
        let user = self
            .user_repository
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let (votes, quiz_attempts, badges, votes_count) = futures::try_join!(
            self.vote_repository
                .recent_votes(user_id, PROFILE_HISTORY_LIMIT),
            self.quiz_repository
                .recent_attempts(user_id, PROFILE_HISTORY_LIMIT),
            self.user_repository.list_badges(user_id),
            self.vote_repository.count_votes(user_id),
        )?;

        let progression = Progression {
            level: LevelProgress::compute(user.level, user.xp, votes_count),
            expertise: calculate_expertise(&quiz_attempts, &votes),
        };
        debug!(
            user_id = %user_id,
            prestige_title = %progression.level.prestige_title,
            "Profile assembled"
        );

        Ok(UserProfileResponse {
            user,
            votes,
            quiz_attempts,
            badges,
            progression,
        })
    }

    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        user_id: &str,
        request: UpdateProfileRequest,
    ) -> Result<UserModel, AppError> {
        let username = match request.username {
            Some(name) => {
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    return Err(AppError::Validation("Username cannot be blank".to_string()));
                }
                Some(trimmed.to_string())
            }
            None => None,
        };

        let changes = ProfileChanges {
            username,
            avatar: request.avatar,
        };
        let user = self
            .user_repository
            .update_profile(user_id, &changes)
            .await?;

        info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    /// Top users by level then XP, with activity counts
    #[instrument(skip(self))]
    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, AppError> {
        let users = self.user_repository.leaderboard(LEADERBOARD_LIMIT).await?;

        let entries = try_join_all(users.into_iter().map(|user| async move {
            let (votes, quiz_attempts) = futures::try_join!(
                self.vote_repository.count_votes(&user.id),
                self.quiz_repository.count_attempts(&user.id),
            )?;
            Ok::<_, AppError>(LeaderboardEntry {
                user,
                count: ActivityCount {
                    votes,
                    quiz_attempts,
                },
            })
        }))
        .await?;

        debug!(entry_count = entries.len(), "Leaderboard computed");
        Ok(entries)
    }
}
