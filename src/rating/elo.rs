//! Adaptive K-factor ELO calculator
//!
//! A question is treated as an opponent whose rating is its difficulty.
//! The expected score comes from the logistic ELO curve provided by the
//! skillratings crate; the K factor shrinks as the player gains experience.

use crate::config::RatingConfig;
use crate::error::{QuizError, Result};
use crate::rating::calculator::RatingCalculator;
use crate::rating::k_factor::KFactorPolicy;
use crate::types::{Rating, RatingOutcome};
use skillratings::elo::EloRating;
use tracing::debug;

/// Probability that a player rated `player_rating` answers an item of
/// `item_difficulty` correctly
pub fn expected_score(player_rating: f64, item_difficulty: f64) -> f64 {
    let (player_expected, _item_expected) = skillratings::elo::expected_score(
        &EloRating {
            rating: player_rating,
        },
        &EloRating {
            rating: item_difficulty,
        },
    );
    player_expected
}

/// ELO calculator with an experience-banded K factor
#[derive(Debug, Clone)]
pub struct AdaptiveEloCalculator {
    config: RatingConfig,
}

impl AdaptiveEloCalculator {
    /// Create a new calculator after validating the configuration
    pub fn new(config: RatingConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self { config })
    }

    pub fn k_factor_policy(&self) -> &KFactorPolicy {
        &self.config.k_factor
    }
}

impl Default for AdaptiveEloCalculator {
    fn default() -> Self {
        Self {
            config: RatingConfig::default(),
        }
    }
}

impl RatingCalculator for AdaptiveEloCalculator {
    fn compute_outcome(
        &self,
        current_rating: Rating,
        item_difficulty: f64,
        is_correct: bool,
        answered_so_far: u64,
    ) -> Result<RatingOutcome> {
        if !item_difficulty.is_finite() {
            return Err(QuizError::InvalidInput {
                reason: format!("item difficulty must be finite, got {}", item_difficulty),
            }
            .into());
        }

        let expected = expected_score(current_rating as f64, item_difficulty);
        let actual = if is_correct { 1.0 } else { 0.0 };
        let k_factor = self.config.k_factor.k_factor(answered_so_far);

        // f64::round rounds half away from zero
        let delta = (k_factor * (actual - expected)).round() as Rating;
        let new_rating =
            current_rating
                .checked_add(delta)
                .ok_or_else(|| QuizError::InvalidInput {
                    reason: format!("rating {} cannot change by {}", current_rating, delta),
                })?;

        debug!(
            current_rating,
            item_difficulty, is_correct, expected, k_factor, delta, "Computed rating outcome"
        );

        Ok(RatingOutcome {
            new_rating,
            delta,
            expected_score: expected,
            k_factor,
        })
    }

    fn initial_rating(&self) -> Rating {
        self.config.initial_rating
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "adaptive_elo",
            "initial_rating": self.config.initial_rating,
            "k_factor": self.config.k_factor,
        })
    }

    fn update_config(&mut self, config: serde_json::Value) -> Result<()> {
        let mut updated = self.config.clone();

        if let Some(rating) = config.get("initial_rating").and_then(|v| v.as_i64()) {
            updated.initial_rating = rating;
        }
        if let Some(policy) = config.get("k_factor") {
            updated.k_factor = serde_json::from_value(policy.clone()).map_err(|e| {
                QuizError::ConfigurationError {
                    message: format!("Invalid k_factor: {}", e),
                }
            })?;
        }

        updated.validate()?;
        self.config = updated;
        Ok(())
    }
}
