use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{quiz, shared::AppState, user, vote};

/// Full HTTP surface of the service
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/auth", post(user::login))
        // Static segments win over `:id`
        .route("/quizzes", get(quiz::list_quizzes).post(quiz::submit_attempt))
        .route("/quizzes/session", get(quiz::global_session))
        .route("/quizzes/journey", get(quiz::journey_session))
        .route("/quizzes/:id", get(quiz::get_quiz))
        .route("/users/leaderboard", get(user::leaderboard))
        .route("/users/:id", get(user::get_profile).patch(user::update_profile))
        .route("/votes", get(vote::top_animes).post(vote::record_vote))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
