//! Quiz session state and the answer recorder
//!
//! A [`QuizSession`] owns everything that changes when a question is
//! answered. [`RatingEngine`] applies one answer to a session: it computes
//! the rating outcome first and only mutates the session once that has
//! succeeded.

use crate::error::Result;
use crate::rating::{AdaptiveEloCalculator, RatingCalculator};
use crate::types::{
    AnsweredItem, HistoryEntry, PlayerStatistics, Rating, RatingOutcome, RatingState,
};
use chrono::{DateTime, Local, Utc};
use tracing::debug;

/// Rating, statistics and answer log of one player
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    pub state: RatingState,
    pub statistics: PlayerStatistics,
    pub history: Vec<HistoryEntry>,
}

impl QuizSession {
    /// Fresh session for a player who has never answered anything
    pub fn new(initial_rating: Rating) -> Self {
        Self {
            state: RatingState::new(initial_rating),
            statistics: PlayerStatistics::new(initial_rating),
            history: Vec::new(),
        }
    }

    pub fn rating(&self) -> Rating {
        self.state.rating
    }

    pub fn streak(&self) -> u32 {
        self.state.streak
    }

    /// Sequence number the next history entry will carry
    pub fn next_question_number(&self) -> u64 {
        self.statistics.total_questions + 1
    }
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new(crate::types::DEFAULT_RATING)
    }
}

/// Applies answers to quiz sessions using a rating calculator
#[derive(Debug)]
pub struct RatingEngine<C: RatingCalculator = AdaptiveEloCalculator> {
    calculator: C,
}

impl<C: RatingCalculator> RatingEngine<C> {
    pub fn new(calculator: C) -> Self {
        Self { calculator }
    }

    pub fn calculator(&self) -> &C {
        &self.calculator
    }

    /// Fresh session starting at the calculator's initial rating
    pub fn new_session(&self) -> QuizSession {
        QuizSession::new(self.calculator.initial_rating())
    }

    /// Pure rating computation, see [`RatingCalculator::compute_outcome`]
    pub fn compute_outcome(
        &self,
        current_rating: Rating,
        item_difficulty: f64,
        is_correct: bool,
        answered_so_far: u64,
    ) -> Result<RatingOutcome> {
        self.calculator.compute_outcome(
            current_rating,
            item_difficulty,
            is_correct,
            answered_so_far,
        )
    }

    /// Record one answer using the local clock
    pub fn record_answer(
        &self,
        session: &mut QuizSession,
        item: &AnsweredItem,
        is_correct: bool,
    ) -> Result<HistoryEntry> {
        self.record_answer_at(session, item, is_correct, Local::now())
    }

    /// Record one answer as if it happened at `now`.
    ///
    /// On error the session is left untouched.
    pub fn record_answer_at(
        &self,
        session: &mut QuizSession,
        item: &AnsweredItem,
        is_correct: bool,
        now: DateTime<Local>,
    ) -> Result<HistoryEntry> {
        let outcome = self.calculator.compute_outcome(
            session.state.rating,
            item.difficulty,
            is_correct,
            session.statistics.total_questions,
        )?;

        let entry = HistoryEntry {
            question_number: session.next_question_number(),
            rating: outcome.new_rating,
            delta: outcome.delta,
            is_correct,
            item_rating: item.difficulty,
            item_id: item.item_id,
            item_text: item.text.clone(),
            category: item.category.clone(),
            timestamp: now.with_timezone(&Utc),
        };

        session.statistics.record_answer(
            &item.category,
            is_correct,
            item.response_time,
            now.date_naive(),
        );
        session.state.apply(&outcome, is_correct);
        session.history.push(entry.clone());

        debug!(
            question_number = entry.question_number,
            item_id = entry.item_id,
            category = %entry.category,
            is_correct,
            delta = entry.delta,
            rating = entry.rating,
            streak = session.state.streak,
            "Recorded answer"
        );

        Ok(entry)
    }
}

impl Default for RatingEngine<AdaptiveEloCalculator> {
    fn default() -> Self {
        Self::new(AdaptiveEloCalculator::default())
    }
}
