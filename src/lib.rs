//! Quiz ELO - adaptive trivia quiz rating engine
//!
//! This crate rates players against question difficulty with an
//! experience-adaptive ELO update, keeps a per-player answer log and
//! statistics, and persists them through a pluggable key-value store.

pub mod config;
pub mod engine;
pub mod error;
pub mod questions;
pub mod rating;
pub mod storage;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{QuizError, Result};
pub use types::*;

// Re-export key components
pub use engine::{HistorySummary, HistoryView, QuizSession, RatingEngine};
pub use rating::{AdaptiveEloCalculator, RatingCalculator};
pub use storage::{FileStore, InMemoryStore, KeyValueStore, SessionRepository};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
