use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for animes table; the id is the catalog's own id
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeModel {
    pub id: i64,
    pub title: String,
    pub image_url: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "anime_type")]
    pub kind: String,
}

/// Display details sent along with a vote, used to create unseen animes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeDetails {
    pub title: String,
    pub image_url: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl AnimeDetails {
    pub fn into_model(self, id: i64) -> AnimeModel {
        AnimeModel {
            id,
            title: self.title,
            image_url: self.image_url,
            kind: self.kind,
        }
    }
}

/// Database model for votes table; only the winner is recorded
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteModel {
    pub id: String,
    pub user_id: String,
    pub anime_id: i64,
    pub created_at: DateTime<Utc>,
}

impl VoteModel {
    pub fn new(user_id: String, anime_id: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            anime_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteWithAnime {
    #[serde(flatten)]
    pub vote: VoteModel,
    pub anime: Option<AnimeModel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoteCount {
    pub votes: i64,
}

/// Ranking row: an anime with its total wins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimeStanding {
    #[serde(flatten)]
    pub anime: AnimeModel,
    #[serde(rename = "_count")]
    pub count: VoteCount,
}
