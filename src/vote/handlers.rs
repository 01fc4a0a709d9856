use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::{AnimeStanding, VoteModel},
    service::VoteService,
    types::RecordVoteRequest,
};
use crate::shared::{AppError, AppState};

/// HTTP handler for recording a matchup outcome
///
/// POST /votes
#[instrument(name = "record_vote", skip(state, request))]
pub async fn record_vote(
    State(state): State<AppState>,
    Json(request): Json<RecordVoteRequest>,
) -> Result<Json<VoteModel>, AppError> {
    info!(
        user_id = %request.user_id,
        winner_id = request.winner_id,
        loser_id = request.loser_id,
        "Recording vote"
    );

    let service = VoteService::new(
        Arc::clone(&state.vote_repository),
        Arc::clone(&state.user_repository),
    );
    let vote = service.record_vote(request).await?;

    Ok(Json(vote))
}

/// HTTP handler for the anime ranking
///
/// GET /votes
#[instrument(name = "top_animes", skip(state))]
pub async fn top_animes(
    State(state): State<AppState>,
) -> Result<Json<Vec<AnimeStanding>>, AppError> {
    let service = VoteService::new(
        Arc::clone(&state.vote_repository),
        Arc::clone(&state.user_repository),
    );
    let standings = service.top_animes().await?;

    info!(anime_count = standings.len(), "Ranking computed");
    Ok(Json(standings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;
    use crate::user::repository::InMemoryUserRepository;
    use crate::vote::repository::InMemoryVoteRepository;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt; // for `oneshot`

    fn app(users: Arc<InMemoryUserRepository>, votes: Arc<InMemoryVoteRepository>) -> Router {
        let app_state = AppStateBuilder::new()
            .with_user_repository(users)
            .with_vote_repository(votes)
            .build();

        Router::new()
            .route("/votes", get(top_animes).post(record_vote))
            .with_state(app_state)
    }

    fn vote_body(user_id: &str, winner_id: i64, loser_id: i64) -> String {
        serde_json::json!({
            "winnerId": winner_id,
            "loserId": loser_id,
            "userId": user_id,
            "animeDetails": {
                "winner": {"title": "Mob Psycho 100", "imageUrl": "https://cdn/mob.webp", "type": "TV"},
                "loser": {"title": "Gintama", "imageUrl": "https://cdn/gintama.webp", "type": "TV"}
            }
        })
        .to_string()
    }

    fn post(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/votes")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_record_vote_handler() {
        let users = Arc::new(InMemoryUserRepository::new());
        let votes = Arc::new(InMemoryVoteRepository::new());
        let user = users.insert_user("sora");

        let response = app(users.clone(), votes.clone())
            .oneshot(post(vote_body(&user.id, 32182, 918)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["animeId"], 32182);
        assert_eq!(json["userId"], user.id.as_str());
        assert_eq!(votes.anime_count(), 2);
    }

    #[tokio::test]
    async fn test_record_vote_handler_same_ids() {
        let users = Arc::new(InMemoryUserRepository::new());
        let votes = Arc::new(InMemoryVoteRepository::new());
        let user = users.insert_user("sora");

        let response = app(users, votes)
            .oneshot(post(vote_body(&user.id, 7, 7)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_record_vote_handler_unknown_user() {
        let response = app(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryVoteRepository::new()),
        )
        .oneshot(post(vote_body("nobody", 1, 2)))
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_top_animes_handler_counts_wins() {
        let users = Arc::new(InMemoryUserRepository::new());
        let votes = Arc::new(InMemoryVoteRepository::new());
        let user = users.insert_user("sora");
        let app = app(users, votes);

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(post(vote_body(&user.id, 1, 2)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let request = Request::builder()
            .uri("/votes")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json[0]["id"], 1);
        assert_eq!(json[0]["_count"]["votes"], 2);
        assert_eq!(json[1]["_count"]["votes"], 0);
    }
}
