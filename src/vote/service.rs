use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{AnimeStanding, VoteModel},
    repository::VoteRepository,
    types::RecordVoteRequest,
};
use crate::shared::AppError;
use crate::user::repository::UserRepository;

/// XP credited to the voter for each recorded matchup
pub const VOTE_XP_REWARD: i64 = 10;

/// Size of the public anime ranking
pub const TOP_ANIME_LIMIT: usize = 10;

/// Service for recording matchup outcomes
pub struct VoteService {
    vote_repository: Arc<dyn VoteRepository + Send + Sync>,
    user_repository: Arc<dyn UserRepository + Send + Sync>,
}

impl VoteService {
    pub fn new(
        vote_repository: Arc<dyn VoteRepository + Send + Sync>,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self {
            vote_repository,
            user_repository,
        }
    }

    /// Stores both animes, appends a vote for the winner and rewards the voter.
    ///
    /// Any failing step fails the whole call.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, winner_id = request.winner_id))]
    pub async fn record_vote(&self, request: RecordVoteRequest) -> Result<VoteModel, AppError> {
        let user_id = request.user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::Validation("User id is required".to_string()));
        }
        if request.winner_id == request.loser_id {
            return Err(AppError::Validation(
                "Winner and loser must be different animes".to_string(),
            ));
        }

        if self.user_repository.get_user(user_id).await?.is_none() {
            warn!(user_id = %user_id, "Vote from unknown user");
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let winner = request.anime_details.winner.into_model(request.winner_id);
        let loser = request.anime_details.loser.into_model(request.loser_id);
        let (winner, loser) = futures::try_join!(
            self.vote_repository.upsert_anime(&winner),
            self.vote_repository.upsert_anime(&loser),
        )?;
        debug!(winner = %winner.title, loser = %loser.title, "Matchup animes stored");

        let vote = VoteModel::new(user_id.to_string(), winner.id);
        self.vote_repository.create_vote(&vote).await?;

        self.user_repository
            .increment_xp(user_id, VOTE_XP_REWARD)
            .await?;

        info!(vote_id = %vote.id, "Vote recorded");
        Ok(vote)
    }

    #[instrument(skip(self))]
    pub async fn top_animes(&self) -> Result<Vec<AnimeStanding>, AppError> {
        self.vote_repository.top_animes(TOP_ANIME_LIMIT).await
    }
}
