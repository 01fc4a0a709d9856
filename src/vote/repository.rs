use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{AnimeModel, AnimeStanding, VoteCount, VoteModel, VoteWithAnime};
use crate::shared::AppError;

/// Trait for anime and vote persistence
#[async_trait]
pub trait VoteRepository {
    /// Creates the anime if absent and returns the stored row; existing rows are never refreshed
    async fn upsert_anime(&self, anime: &AnimeModel) -> Result<AnimeModel, AppError>;
    async fn get_anime(&self, anime_id: i64) -> Result<Option<AnimeModel>, AppError>;
    async fn create_vote(&self, vote: &VoteModel) -> Result<(), AppError>;
    /// Most recent votes first
    async fn recent_votes(&self, user_id: &str, limit: usize)
        -> Result<Vec<VoteWithAnime>, AppError>;
    async fn count_votes(&self, user_id: &str) -> Result<i64, AppError>;
    /// Animes ordered by number of wins, descending
    async fn top_animes(&self, limit: usize) -> Result<Vec<AnimeStanding>, AppError>;
}

/// In-memory implementation of VoteRepository for development and testing
pub struct InMemoryVoteRepository {
    animes: Mutex<HashMap<i64, AnimeModel>>,
    votes: Mutex<Vec<VoteModel>>,
}

impl Default for InMemoryVoteRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryVoteRepository {
    pub fn new() -> Self {
        Self {
            animes: Mutex::new(HashMap::new()),
            votes: Mutex::new(Vec::new()),
        }
    }

    pub fn anime_count(&self) -> usize {
        self.animes.lock().unwrap().len()
    }

    pub fn vote_count(&self) -> usize {
        self.votes.lock().unwrap().len()
    }
}

#[async_trait]
impl VoteRepository for InMemoryVoteRepository {
    #[instrument(skip(self, anime), fields(anime_id = anime.id))]
    async fn upsert_anime(&self, anime: &AnimeModel) -> Result<AnimeModel, AppError> {
        let mut animes = self.animes.lock().unwrap();
        let stored = animes
            .entry(anime.id)
            .or_insert_with(|| {
                debug!(title = %anime.title, "Creating anime in memory");
                anime.clone()
            })
            .clone();
        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn get_anime(&self, anime_id: i64) -> Result<Option<AnimeModel>, AppError> {
        Ok(self.animes.lock().unwrap().get(&anime_id).cloned())
    }

    #[instrument(skip(self, vote), fields(vote_id = %vote.id))]
    async fn create_vote(&self, vote: &VoteModel) -> Result<(), AppError> {
        if !self.animes.lock().unwrap().contains_key(&vote.anime_id) {
            warn!(anime_id = vote.anime_id, "Vote references unknown anime");
            return Err(AppError::DatabaseError(
                "Vote references unknown anime".to_string(),
            ));
        }

        self.votes.lock().unwrap().push(vote.clone());
        debug!(anime_id = vote.anime_id, "Vote recorded in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn recent_votes(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<VoteWithAnime>, AppError> {
        let mut votes: Vec<VoteModel> = self
            .votes
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect();
        votes.sort_by_key(|v| v.created_at);
        votes.reverse();
        votes.truncate(limit);

        let animes = self.animes.lock().unwrap();
        Ok(votes
            .into_iter()
            .map(|vote| VoteWithAnime {
                anime: animes.get(&vote.anime_id).cloned(),
                vote,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn count_votes(&self, user_id: &str) -> Result<i64, AppError> {
        let votes = self.votes.lock().unwrap();
        Ok(votes.iter().filter(|v| v.user_id == user_id).count() as i64)
    }

    #[instrument(skip(self))]
    async fn top_animes(&self, limit: usize) -> Result<Vec<AnimeStanding>, AppError> {
        let mut wins: HashMap<i64, i64> = HashMap::new();
        for vote in self.votes.lock().unwrap().iter() {
            *wins.entry(vote.anime_id).or_default() += 1;
        }

        let animes = self.animes.lock().unwrap();
        let mut standings: Vec<AnimeStanding> = animes
            .values()
            .map(|anime| AnimeStanding {
                count: VoteCount {
                    votes: wins.get(&anime.id).copied().unwrap_or_default(),
                },
                anime: anime.clone(),
            })
            .collect();
        standings.sort_by(|a, b| {
            b.count
                .votes
                .cmp(&a.count.votes)
                .then(a.anime.id.cmp(&b.anime.id))
        });
        standings.truncate(limit);
        Ok(standings)
    }
}

/// PostgreSQL implementation of vote repository
pub struct PostgresVoteRepository {
    pool: PgPool,
}

impl PostgresVoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct VoteRow {
    id: String,
    user_id: String,
    anime_id: i64,
    created_at: chrono::DateTime<chrono::Utc>,
    title: Option<String>,
    image_url: Option<String>,
    anime_type: Option<String>,
}

impl From<VoteRow> for VoteWithAnime {
    fn from(row: VoteRow) -> Self {
        let anime = match (row.title, row.image_url, row.anime_type) {
            (Some(title), Some(image_url), Some(kind)) => Some(AnimeModel {
                id: row.anime_id,
                title,
                image_url,
                kind,
            }),
            _ => None,
        };

        VoteWithAnime {
            vote: VoteModel {
                id: row.id,
                user_id: row.user_id,
                anime_id: row.anime_id,
                created_at: row.created_at,
            },
            anime,
        }
    }
}

#[derive(sqlx::FromRow)]
struct StandingRow {
    #[sqlx(flatten)]
    anime: AnimeModel,
    vote_count: i64,
}

#[async_trait]
impl VoteRepository for PostgresVoteRepository {
    #[instrument(skip(self, anime), fields(anime_id = anime.id))]
    async fn upsert_anime(&self, anime: &AnimeModel) -> Result<AnimeModel, AppError> {
        sqlx::query(
            "INSERT INTO animes (id, title, image_url, anime_type) VALUES ($1, $2, $3, $4) ON CONFLICT (id) DO NOTHING",
        )
        .bind(anime.id)
        .bind(&anime.title)
        .bind(&anime.image_url)
        .bind(&anime.kind)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to upsert anime");
            AppError::from(e)
        })?;

        self.get_anime(anime.id)
            .await?
            .ok_or_else(|| AppError::DatabaseError("Anime vanished after upsert".to_string()))
    }

    #[instrument(skip(self))]
    async fn get_anime(&self, anime_id: i64) -> Result<Option<AnimeModel>, AppError> {
        sqlx::query_as::<_, AnimeModel>(
            "SELECT id, title, image_url, anime_type FROM animes WHERE id = $1",
        )
        .bind(anime_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch anime");
            AppError::from(e)
        })
    }

    #[instrument(skip(self, vote), fields(vote_id = %vote.id))]
    async fn create_vote(&self, vote: &VoteModel) -> Result<(), AppError> {
        sqlx::query("INSERT INTO votes (id, user_id, anime_id, created_at) VALUES ($1, $2, $3, $4)")
            .bind(&vote.id)
            .bind(&vote.user_id)
            .bind(vote.anime_id)
            .bind(vote.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to record vote");
                AppError::from(e)
            })?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn recent_votes(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<VoteWithAnime>, AppError> {
        let rows = sqlx::query_as::<_, VoteRow>(
            "SELECT v.id, v.user_id, v.anime_id, v.created_at, a.title, a.image_url, a.anime_type \
             FROM votes v LEFT JOIN animes a ON a.id = v.anime_id \
             WHERE v.user_id = $1 ORDER BY v.created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch recent votes");
            AppError::from(e)
        })?;

        Ok(rows.into_iter().map(VoteWithAnime::from).collect())
    }

    #[instrument(skip(self))]
    async fn count_votes(&self, user_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM votes WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to count votes");
                AppError::from(e)
            })
    }

    #[instrument(skip(self))]
    async fn top_animes(&self, limit: usize) -> Result<Vec<AnimeStanding>, AppError> {
        let rows = sqlx::query_as::<_, StandingRow>(
            "SELECT a.id, a.title, a.image_url, a.anime_type, COUNT(v.id) AS vote_count \
             FROM animes a LEFT JOIN votes v ON v.anime_id = a.id \
             GROUP BY a.id ORDER BY vote_count DESC, a.id ASC LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch top animes");
            AppError::from(e)
        })?;

        Ok(rows
            .into_iter()
            .map(|row| AnimeStanding {
                anime: row.anime,
                count: VoteCount {
                    votes: row.vote_count,
                },
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn anime(id: i64, title: &str) -> AnimeModel {
        AnimeModel {
            id,
            title: title.to_string(),
            image_url: format!("https://cdn/{}.webp", id),
            kind: "Anime".to_string(),
        }
    }

    #[tokio::test]
    async fn upsert_never_overwrites_existing_anime() {
        let repo = InMemoryVoteRepository::new();

        repo.upsert_anime(&anime(1, "Original")).await.unwrap();
        let second = repo.upsert_anime(&anime(1, "Changed")).await.unwrap();

        assert_eq!(second.title, "Original");
        assert_eq!(repo.get_anime(1).await.unwrap().unwrap().title, "Original");
        assert_eq!(repo.anime_count(), 1);
    }

    #[tokio::test]
    async fn vote_for_unknown_anime_fails() {
        let repo = InMemoryVoteRepository::new();
        let result = repo.create_vote(&VoteModel::new("u".into(), 404)).await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
        assert_eq!(repo.vote_count(), 0);
    }

    #[tokio::test]
    async fn top_animes_ranks_by_wins_including_zero() {
        let repo = InMemoryVoteRepository::new();
        for (id, title) in [(1, "A"), (2, "B"), (3, "C")] {
            repo.upsert_anime(&anime(id, title)).await.unwrap();
        }
        for anime_id in [2, 2, 3, 2, 3] {
            repo.create_vote(&VoteModel::new("u".into(), anime_id))
                .await
                .unwrap();
        }

        let top = repo.top_animes(10).await.unwrap();
        let ranking: Vec<_> = top.iter().map(|s| (s.anime.id, s.count.votes)).collect();
        assert_eq!(ranking, vec![(2, 3), (3, 2), (1, 0)]);

        assert_eq!(repo.top_animes(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn recent_votes_are_newest_first_with_anime() {
        let repo = InMemoryVoteRepository::new();
        repo.upsert_anime(&anime(1, "A")).await.unwrap();
        repo.upsert_anime(&anime(2, "B")).await.unwrap();

        let mut older = VoteModel::new("u".into(), 1);
        older.created_at = Utc::now() - Duration::minutes(5);
        repo.create_vote(&older).await.unwrap();
        repo.create_vote(&VoteModel::new("u".into(), 2)).await.unwrap();
        repo.create_vote(&VoteModel::new("other".into(), 2))
            .await
            .unwrap();

        let recent = repo.recent_votes("u", 5).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].anime.as_ref().unwrap().title, "B");
        assert_eq!(recent[1].vote.id, older.id);
        assert_eq!(repo.count_votes("u").await.unwrap(), 2);
    }
}
