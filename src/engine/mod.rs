//! Rating engine and answer log
//!
//! This module applies answered questions to a player's session and
//! provides read-only views over the resulting history.

pub mod history;
pub mod session;

// Re-export commonly used types
pub use history::{HistorySummary, HistoryView};
pub use session::{QuizSession, RatingEngine};
