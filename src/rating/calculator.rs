//! Rating calculator trait and a recording mock
//!
//! This module defines the interface the rating engine uses to turn one
//! answered question into a rating outcome.

use crate::types::{Rating, RatingOutcome};

/// Trait for calculating a player's rating change after one answer
pub trait RatingCalculator: Send + Sync {
    /// Compute the outcome of answering an item
    ///
    /// # Arguments
    /// * `current_rating` - Player rating before the answer
    /// * `item_difficulty` - Rating of the question; must be finite
    /// * `is_correct` - Whether the answer was correct
    /// * `answered_so_far` - Questions previously answered, used to pick K
    ///
    /// # Returns
    /// The new rating and signed delta, or `InvalidInput` for a non-finite difficulty
    fn compute_outcome(
        &self,
        current_rating: Rating,
        item_difficulty: f64,
        is_correct: bool,
        answered_so_far: u64,
    ) -> crate::error::Result<RatingOutcome>;

    /// Get the initial rating for new players
    fn initial_rating(&self) -> Rating;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;

    /// Update configuration from JSON
    fn update_config(&mut self, config: serde_json::Value) -> crate::error::Result<()>;
}

/// Arguments of one `compute_outcome` call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeCall {
    pub current_rating: Rating,
    pub item_difficulty: f64,
    pub is_correct: bool,
    pub answered_so_far: u64,
}

/// Mock rating calculator for testing
///
/// Applies a fixed delta (added on correct answers, subtracted otherwise)
/// and records every call.
#[derive(Debug)]
pub struct MockRatingCalculator {
    calls: std::sync::Mutex<Vec<OutcomeCall>>,
    fixed_delta: Rating,
    initial_rating: Rating,
}

impl MockRatingCalculator {
    pub fn new(fixed_delta: Rating) -> Self {
        Self {
            calls: std::sync::Mutex::new(Vec::new()),
            fixed_delta,
            initial_rating: crate::types::DEFAULT_RATING,
        }
    }

    /// Get all calls made (for testing)
    pub fn get_calls(&self) -> Vec<OutcomeCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Clear recorded calls
    pub fn clear_calls(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }
}

impl Default for MockRatingCalculator {
    fn default() -> Self {
        Self::new(10)
    }
}

impl RatingCalculator for MockRatingCalculator {
    fn compute_outcome(
        &self,
        current_rating: Rating,
        item_difficulty: f64,
        is_correct: bool,
        answered_so_far: u64,
    ) -> crate::error::Result<RatingOutcome> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(OutcomeCall {
                current_rating,
                item_difficulty,
                is_correct,
                answered_so_far,
            });
        }

        if !item_difficulty.is_finite() {
            return Err(crate::error::QuizError::InvalidInput {
                reason: format!("item difficulty must be finite, got {}", item_difficulty),
            }
            .into());
        }

        let delta = if is_correct {
            self.fixed_delta
        } else {
            -self.fixed_delta
        };

        let new_rating = current_rating.checked_add(delta).ok_or_else(|| {
            crate::error::QuizError::InvalidInput {
                reason: format!("rating {} cannot change by {}", current_rating, delta),
            }
        })?;

        Ok(RatingOutcome {
            new_rating,
            delta,
            expected_score: 0.5,
            k_factor: (self.fixed_delta * 2) as f64,
        })
    }

    fn initial_rating(&self) -> Rating {
        self.initial_rating
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "mock",
            "initial_rating": self.initial_rating,
            "fixed_delta": self.fixed_delta
        })
    }

    fn update_config(&mut self, config: serde_json::Value) -> crate::error::Result<()> {
        if let Some(rating) = config.get("initial_rating").and_then(|v| v.as_i64()) {
            self.initial_rating = rating;
        }
        if let Some(delta) = config.get("fixed_delta").and_then(|v| v.as_i64()) {
            self.fixed_delta = delta;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_calculator() {
        let calculator = MockRatingCalculator::new(5);

        let win = calculator.compute_outcome(1000, 1200.0, true, 3).unwrap();
        assert_eq!(win.new_rating, 1005);
        assert_eq!(win.delta, 5);

        let loss = calculator.compute_outcome(1005, 900.0, false, 4).unwrap();
        assert_eq!(loss.new_rating, 1000);

        let calls = calculator.get_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].answered_so_far, 3);
        assert_eq!(calls[1].current_rating, 1005);

        calculator.clear_calls();
        assert!(calculator.get_calls().is_empty());
    }

    #[test]
    fn test_mock_calculator_rejects_nan() {
        let calculator = MockRatingCalculator::default();
        assert!(calculator
            .compute_outcome(1000, f64::NAN, true, 0)
            .is_err());
    }

    #[test]
    fn test_mock_calculator_rejects_overflow() {
        let calculator = MockRatingCalculator::new(10);
        assert!(calculator.compute_outcome(Rating::MAX, 800.0, true, 0).is_err());
        assert!(calculator.compute_outcome(Rating::MIN, 800.0, false, 0).is_err());
        assert!(calculator.compute_outcome(Rating::MAX, 800.0, false, 0).is_ok());
    }

    #[test]
    fn test_mock_calculator_config() {
        let mut calculator = MockRatingCalculator::default();
        assert_eq!(calculator.initial_rating(), 800);

        calculator
            .update_config(serde_json::json!({
                "initial_rating": 1000,
                "fixed_delta": 7
            }))
            .unwrap();

        assert_eq!(calculator.initial_rating(), 1000);
        assert_eq!(calculator.config()["fixed_delta"], 7);
    }
}
