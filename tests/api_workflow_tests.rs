use std::sync::Arc;

use otaku_arena::{
    client::{is_not_found, ClientError, QuizApi, VoteApi, VoteDispatcher},
    quiz::models::GLOBAL_CHALLENGE_ID,
    user::types::UpdateProfileRequest,
    vote::{models::AnimeDetails, MatchupDetails, RecordVoteRequest},
};

mod utils;

use utils::*;

fn details(title: &str) -> AnimeDetails {
    AnimeDetails {
        title: title.to_string(),
        image_url: format!("https://cdn/{}.webp", title.to_lowercase()),
        kind: "Anime".to_string(),
    }
}

fn vote(user_id: &str, winner_id: i64, loser_id: i64) -> RecordVoteRequest {
    RecordVoteRequest {
        winner_id,
        loser_id,
        user_id: user_id.to_string(),
        anime_details: MatchupDetails {
            winner: details("Frieren"),
            loser: details("Naruto"),
        },
    }
}

#[tokio::test]
async fn test_login_is_find_or_create() {
    let server = TestServerBuilder::new().build().await;

    let first = server.client.login("Gon").await.unwrap();
    let again = server.client.login("  Gon ").await.unwrap();

    assert_eq!(first.id, again.id);
    assert_eq!(first.level, 1);
    assert!(first.avatar.ends_with("seed=Gon"));
    assert_eq!(server.users.user_count(), 1);

    let blank = server.client.login(" ").await.unwrap_err();
    assert_eq!(blank.status(), Some(400));
}

#[tokio::test]
async fn test_vote_creates_animes_and_rewards_voter() {
    let server = TestServerBuilder::new().build().await;
    let user = server.client.login("Killua").await.unwrap();

    let recorded = server
        .client
        .record_vote(&vote(&user.id, 52991, 20))
        .await
        .unwrap();

    assert_eq!(recorded.anime_id, 52991);
    assert_eq!(server.votes.anime_count(), 2);
    assert_eq!(server.votes.vote_count(), 1);
    assert_eq!(server.users.xp_of(&user.id), Some(10));

    let ranking = server.client.top_animes().await.unwrap();
    assert_eq!(ranking[0].anime.id, 52991);
    assert_eq!(ranking[0].anime.title, "Frieren");
    assert_eq!(ranking[0].count.votes, 1);
    assert_eq!(ranking[1].count.votes, 0);
}

#[tokio::test]
async fn test_invalid_votes_are_rejected_without_writes() {
    let server = TestServerBuilder::new().build().await;
    let user = server.client.login("Leorio").await.unwrap();

    let same = server
        .client
        .record_vote(&vote(&user.id, 7, 7))
        .await
        .unwrap_err();
    assert_eq!(same.status(), Some(400));

    let ghost = server
        .client
        .record_vote(&vote("no-such-user", 1, 2))
        .await
        .unwrap_err();
    assert!(is_not_found(&ghost));

    assert_eq!(server.votes.anime_count(), 0);
    assert_eq!(server.users.xp_of(&user.id), Some(0));
}

#[tokio::test]
async fn test_global_session_result_lands_on_virtual_quiz() {
    let server = TestServerBuilder::new().build().await;
    let user = server.client.login("Kurapika").await.unwrap();

    let session = server.client.global_session().await.unwrap();
    assert!(session.id.starts_with("session-"));
    assert_eq!(session.question_count(), 30);

    let result = server
        .client
        .submit_result(&user.id, &session.id, 80)
        .await
        .unwrap();
    assert_eq!(result.attempt.quiz_id, GLOBAL_CHALLENGE_ID);
    assert_eq!(result.xp_gained, 400);

    let profile = server.client.profile(&user.id).await.unwrap();
    assert_eq!(profile.user.xp, 400);
    assert_eq!(profile.quiz_attempts.len(), 1);
    assert_eq!(
        profile.quiz_attempts[0].quiz.as_ref().unwrap().title,
        "Défi Global"
    );
    assert_eq!(profile.progression.level.xp_to_next_level, 600);
}

#[tokio::test]
async fn test_bundle_browsing_and_submission() {
    let server = TestServerBuilder::new().build().await;
    let user = server.client.login("Hisoka").await.unwrap();

    let summaries = server.client.list_quizzes().await.unwrap();
    assert_eq!(summaries.len(), 8);

    let bundle = server.client.get_quiz(&summaries[0].id).await.unwrap();
    assert_eq!(bundle.questions.len(), summaries[0].question_count);

    let result = server
        .client
        .submit_result(&user.id, &bundle.id, 50)
        .await
        .unwrap();
    assert_eq!(result.attempt.quiz_id, bundle.id);
    assert_eq!(
        result.xp_gained,
        (f64::from(bundle.xp_reward) * 0.5).round() as i64
    );

    let missing = server.client.get_quiz("bleach").await.unwrap_err();
    assert!(is_not_found(&missing));
}

#[tokio::test]
async fn test_journey_roadmap_matches_questions() {
    let server = TestServerBuilder::new().build().await;

    let journey = server.client.journey_session().await.unwrap();
    let roadmap = journey.roadmap.clone().unwrap();

    assert!(journey.id.starts_with("journey-"));
    assert_eq!(roadmap.len(), 5);
    let mut offset = 0;
    for segment in &roadmap {
        let group = &journey.questions[offset..offset + segment.question_count];
        assert!(group
            .iter()
            .all(|q| q.quiz_id.as_deref() == Some(segment.quiz_id.as_str())));
        offset += segment.question_count;
    }
    assert_eq!(offset, journey.question_count());
}

#[tokio::test]
async fn test_profile_update_and_conflicts() {
    let server = TestServerBuilder::new().build().await;
    let alice = server.client.login("alice").await.unwrap();
    server.client.login("bob").await.unwrap();

    let taken = server
        .client
        .update_profile(
            &alice.id,
            &UpdateProfileRequest {
                username: Some("bob".to_string()),
                avatar: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(taken, ClientError::Api { status: 400, .. }));

    let updated = server
        .client
        .update_profile(
            &alice.id,
            &UpdateProfileRequest {
                username: Some("alicia".to_string()),
                avatar: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.username, "alicia");
    assert_eq!(updated.avatar, alice.avatar);

    let missing = server
        .client
        .update_profile("ghost", &UpdateProfileRequest::default())
        .await
        .unwrap_err();
    assert!(is_not_found(&missing));
}

#[tokio::test]
async fn test_leaderboard_is_cached_until_refreshed() {
    let server = TestServerBuilder::new().build().await;
    let first = server.client.login("Meruem").await.unwrap();

    let board = server.client.leaderboard().await.unwrap();
    assert_eq!(board.len(), 1);

    let second = server.client.login("Komugi").await.unwrap();
    server
        .client
        .submit_result(&second.id, "session-1", 100)
        .await
        .unwrap();

    // Served from the cache
    assert_eq!(server.client.leaderboard().await.unwrap().len(), 1);

    server.client.refresh_rankings().await;
    let board = server.client.leaderboard().await.unwrap();
    assert_eq!(board.len(), 2);
    assert_eq!(board[0].user.id, second.id);
    assert_eq!(board[0].count.quiz_attempts, 1);
    assert_eq!(board[1].user.id, first.id);
}

#[tokio::test]
async fn test_dispatched_vote_reaches_server() {
    let server = TestServerBuilder::new().build().await;
    let user = server.client.login("Netero").await.unwrap();
    let client = Arc::new(otaku_arena::client::HttpApiClient::new(server.base_url.clone()).unwrap());

    let dispatcher = VoteDispatcher::new(client);
    dispatcher
        .dispatch(vote(&user.id, 1, 2))
        .await
        .unwrap();

    assert_eq!(server.votes.vote_count(), 1);
    assert_eq!(server.users.xp_of(&user.id), Some(10));
}
