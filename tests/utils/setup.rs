use std::sync::Arc;
use tokio::{net::TcpListener, task::JoinHandle};

use otaku_arena::{
    build_router,
    client::HttpApiClient,
    quiz::{
        models::Question,
        repository::InMemoryQuizRepository,
    },
    scoring::ScoringService,
    user::repository::InMemoryUserRepository,
    vote::repository::InMemoryVoteRepository,
    AppState, QuizBank, Session,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// A live server on an ephemeral port, backed by in-memory repositories
pub struct TestServer {
    pub base_url: String,
    pub client: HttpApiClient,
    pub users: Arc<InMemoryUserRepository>,
    pub votes: Arc<InMemoryVoteRepository>,
    pub quizzes: Arc<InMemoryQuizRepository>,
    pub _server_handle: JoinHandle<()>,
}

pub struct TestServerBuilder {
    bank: Option<QuizBank>,
}

impl TestServerBuilder {
    pub fn new() -> Self {
        Self { bank: None }
    }

    pub fn with_bank(mut self, bank: QuizBank) -> Self {
        self.bank = Some(bank);
        self
    }

    pub async fn build(self) -> TestServer {
        let bank = Arc::new(match self.bank {
            Some(bank) => bank,
            None => QuizBank::bundled().unwrap(),
        });
        let users = Arc::new(InMemoryUserRepository::new());
        let votes = Arc::new(InMemoryVoteRepository::new());
        let quizzes = Arc::new(InMemoryQuizRepository::new());

        ScoringService::new(quizzes.clone(), users.clone(), bank.clone())
            .ensure_quiz_records()
            .await
            .unwrap();

        let app_state = AppState::new(users.clone(), votes.clone(), quizzes.clone(), bank);
        let app = build_router(app_state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let server_handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            client: HttpApiClient::new(base_url.clone()).unwrap(),
            base_url,
            users,
            votes,
            quizzes,
            _server_handle: server_handle,
        }
    }
}

/// Session whose question `i` has `answers[i]` as its right option among four
pub fn session_with_answers(id: &str, answers: &[usize]) -> Session {
    let questions = answers
        .iter()
        .enumerate()
        .map(|(i, answer)| Question {
            question: format!("Question {}", i + 1),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            answer: *answer,
            anime_title: None,
            quiz_id: None,
        })
        .collect();

    Session {
        id: id.to_string(),
        title: "Test session".to_string(),
        questions,
        xp_reward: 500,
        roadmap: None,
    }
}
