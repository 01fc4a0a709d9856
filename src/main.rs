use std::{error::Error, sync::Arc};

use otaku_arena::{
    build_router,
    quiz::repository::{InMemoryQuizRepository, PostgresQuizRepository, QuizRepository},
    scoring::ScoringService,
    user::repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository},
    vote::repository::{InMemoryVoteRepository, PostgresVoteRepository, VoteRepository},
    AppState, Config, QuizBank,
};
use tokio::{
    net::TcpListener,
    signal::{
        ctrl_c,
        unix::{signal, SignalKind},
    },
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Repositories = (
    Arc<dyn UserRepository + Send + Sync>,
    Arc<dyn VoteRepository + Send + Sync>,
    Arc<dyn QuizRepository + Send + Sync>,
);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "otaku_arena=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting otaku arena server");
    let config = Config::load()?;

    let quiz_bank = Arc::new(match &config.quiz_bank_path {
        Some(path) => QuizBank::from_path(path)?,
        None => QuizBank::bundled()?,
    });
    info!(bundles = quiz_bank.len(), "Quiz bank loaded");

    let (user_repository, vote_repository, quiz_repository) = repositories(&config).await?;

    ScoringService::new(
        Arc::clone(&quiz_repository),
        Arc::clone(&user_repository),
        Arc::clone(&quiz_bank),
    )
    .ensure_quiz_records()
    .await?;

    let app_state = AppState::new(user_repository, vote_repository, quiz_repository, quiz_bank);
    let app = build_router(app_state);

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn repositories(config: &Config) -> Result<Repositories, Box<dyn Error>> {
    let Some(database_url) = &config.database_url else {
        warn!("DATABASE_URL not set, records are kept in memory");
        return Ok((
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryVoteRepository::new()),
            Arc::new(InMemoryQuizRepository::new()),
        ));
    };

    let pool = sqlx::PgPool::connect(database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Connected to PostgreSQL, migrations applied");

    Ok((
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(PostgresVoteRepository::new(pool.clone())),
        Arc::new(PostgresQuizRepository::new(pool)),
    ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
