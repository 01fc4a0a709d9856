// Library crate for the otaku arena server and client
// This file exposes the public API for the binary and integration tests

pub mod cache;
pub mod catalog;
pub mod client;
pub mod config;
pub mod quiz;
pub mod routes;
pub mod scoring;
pub mod shared;
pub mod user;
pub mod vote;

// Re-export commonly used types for easier access in tests
pub use config::{Config, ConfigError};
pub use quiz::{QuizBank, Session};
pub use routes::build_router;
pub use shared::{AppError, AppState};
