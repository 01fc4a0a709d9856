use serde::{Deserialize, Serialize};

/// Request payload for submitting a finished (or abandoned) session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAttemptRequest {
    pub user_id: String,
    pub quiz_id: String,
    pub score: i64,
}
