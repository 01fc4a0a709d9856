pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use mocks::{FlakySlot, MockQuizApi};
#[allow(unused_imports)]
pub use setup::{session_with_answers, TestServer, TestServerBuilder};
