//! Question source
//!
//! Parses question bank files, merges banks into a combined set and deals
//! questions in shuffled order.

pub mod bank;
pub mod deck;

// Re-export commonly used types
pub use bank::{Question, QuestionBank, FALLBACK_LABEL};
pub use deck::{PresentedQuestion, QuestionDeck};
