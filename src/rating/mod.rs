//! ELO rating computation
//!
//! This module provides the rating calculator interface, the adaptive
//! K-factor ELO implementation and the policy that selects K from a
//! player's experience.

pub mod calculator;
pub mod elo;
pub mod k_factor;

// Re-export commonly used types
pub use calculator::{MockRatingCalculator, RatingCalculator};
pub use elo::{expected_score, AdaptiveEloCalculator};
pub use k_factor::{KFactorBand, KFactorPolicy};
