use serde::{Deserialize, Serialize};

use super::models::AnimeDetails;

/// Display details of both sides of a matchup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchupDetails {
    pub winner: AnimeDetails,
    pub loser: AnimeDetails,
}

/// Request payload for recording a matchup outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordVoteRequest {
    pub winner_id: i64,
    pub loser_id: i64,
    pub user_id: String,
    pub anime_details: MatchupDetails,
}
