use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::cache::{TimedCache, LEADERBOARD_TTL};
use crate::quiz::models::{QuizBundle, QuizSummary};
use crate::quiz::{Session, SubmitAttemptRequest};
use crate::scoring::AttemptResult;
use crate::user::types::UpdateProfileRequest;
use crate::user::{LeaderboardEntry, UserModel, UserProfileResponse};
use crate::vote::models::{AnimeStanding, VoteModel};
use crate::vote::RecordVoteRequest;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Result submission, the only server call a quiz player makes
#[async_trait]
pub trait QuizApi: Send + Sync {
    async fn submit_result(
        &self,
        user_id: &str,
        quiz_id: &str,
        score: u8,
    ) -> Result<AttemptResult, ClientError>;
}

#[async_trait]
pub trait VoteApi: Send + Sync {
    async fn record_vote(&self, request: &RecordVoteRequest) -> Result<VoteModel, ClientError>;
}

#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
}

/// Typed client for the HTTP API.
///
/// Leaderboard and anime ranking reads are served from a five minute cache.
pub struct HttpApiClient {
    base_url: String,
    http: reqwest::Client,
    leaderboard_cache: TimedCache<(), Vec<LeaderboardEntry>>,
    ranking_cache: TimedCache<(), Vec<AnimeStanding>>,
}

impl HttpApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            leaderboard_cache: TimedCache::new(LEADERBOARD_TTL),
            ranking_cache: TimedCache::new(LEADERBOARD_TTL),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
        };
        warn!(status = %status, message = %message, "API call failed");
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        debug!(path = %path, "GET");
        let response = self.http.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        debug!(path = %path, method = %method, "Sending JSON");
        let response = self
            .http
            .request(method, self.url(path))
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    pub async fn login(&self, username: &str) -> Result<UserModel, ClientError> {
        self.send_json(reqwest::Method::POST, "/auth", &LoginBody { username })
            .await
    }

    pub async fn list_quizzes(&self) -> Result<Vec<QuizSummary>, ClientError> {
        self.get("/quizzes").await
    }

    pub async fn get_quiz(&self, quiz_id: &str) -> Result<QuizBundle, ClientError> {
        self.get(&format!("/quizzes/{}", quiz_id)).await
    }

    pub async fn global_session(&self) -> Result<Session, ClientError> {
        self.get("/quizzes/session").await
    }

    pub async fn journey_session(&self) -> Result<Session, ClientError> {
        self.get("/quizzes/journey").await
    }

    pub async fn profile(&self, user_id: &str) -> Result<UserProfileResponse, ClientError> {
        self.get(&format!("/users/{}", user_id)).await
    }

    #[instrument(skip(self, changes))]
    pub async fn update_profile(
        &self,
        user_id: &str,
        changes: &UpdateProfileRequest,
    ) -> Result<UserModel, ClientError> {
        self.send_json(
            reqwest::Method::PATCH,
            &format!("/users/{}", user_id),
            changes,
        )
        .await
    }

    /// Cached for five minutes
    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ClientError> {
        self.leaderboard_cache
            .get_or_try_insert_with((), || self.get("/users/leaderboard"))
            .await
    }

    /// Cached for five minutes
    pub async fn top_animes(&self) -> Result<Vec<AnimeStanding>, ClientError> {
        self.ranking_cache
            .get_or_try_insert_with((), || self.get("/votes"))
            .await
    }

    /// Drops cached rankings so the next read hits the server
    pub async fn refresh_rankings(&self) {
        self.leaderboard_cache.invalidate(&()).await;
        self.ranking_cache.invalidate(&()).await;
    }
}

#[async_trait]
impl QuizApi for HttpApiClient {
    #[instrument(skip(self))]
    async fn submit_result(
        &self,
        user_id: &str,
        quiz_id: &str,
        score: u8,
    ) -> Result<AttemptResult, ClientError> {
        let body = SubmitAttemptRequest {
            user_id: user_id.to_string(),
            quiz_id: quiz_id.to_string(),
            score: i64::from(score),
        };
        self.send_json(reqwest::Method::POST, "/quizzes", &body)
            .await
    }
}

#[async_trait]
impl VoteApi for HttpApiClient {
    #[instrument(skip(self, request), fields(winner_id = request.winner_id))]
    async fn record_vote(&self, request: &RecordVoteRequest) -> Result<VoteModel, ClientError> {
        self.send_json(reqwest::Method::POST, "/votes", request)
            .await
    }
}

/// True when the server answered with a 404
pub fn is_not_found(error: &ClientError) -> bool {
    error.status() == Some(StatusCode::NOT_FOUND.as_u16())
}
