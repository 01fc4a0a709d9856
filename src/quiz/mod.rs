// Public API - what other modules can use
pub use bank::{BankError, QuizBank};
pub use handlers::{get_quiz, global_session, journey_session, list_quizzes, submit_attempt};
pub use service::QuizService;
pub use session::{RoadmapSegment, Session, SessionEngine, SessionKind};
pub use types::SubmitAttemptRequest;

// Internal modules
pub mod bank;
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod session;
mod types;
