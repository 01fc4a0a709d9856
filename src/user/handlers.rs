use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::UserModel,
    service::UserService,
    types::{LeaderboardEntry, LoginRequest, UpdateProfileRequest, UserProfileResponse},
};
use crate::shared::{AppError, AppState};

fn user_service(state: &AppState) -> UserService {
    UserService::new(
        Arc::clone(&state.user_repository),
        Arc::clone(&state.vote_repository),
        Arc::clone(&state.quiz_repository),
    )
}

/// HTTP handler for login-by-name
///
/// POST /auth
/// Returns the existing user for that name, or a freshly created one
#[instrument(name = "login", skip(state))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<UserModel>, AppError> {
    let user = user_service(&state).login(&request.username).await?;
    Ok(Json(user))
}

/// GET /users/:id
#[instrument(name = "get_profile", skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfileResponse>, AppError> {
    let profile = user_service(&state).profile(&user_id).await?;

    info!(
        user_id = %user_id,
        vote_count = profile.votes.len(),
        attempt_count = profile.quiz_attempts.len(),
        "Profile served"
    );
    Ok(Json(profile))
}

/// PATCH /users/:id
#[instrument(name = "update_profile", skip(state))]
pub async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserModel>, AppError> {
    let user = user_service(&state)
        .update_profile(&user_id, request)
        .await?;
    Ok(Json(user))
}

/// GET /users/leaderboard
#[instrument(name = "leaderboard", skip(state))]
pub async fn leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let entries = user_service(&state).leaderboard().await?;
    info!(entry_count = entries.len(), "Leaderboard served");
    Ok(Json(entries))
}
