//! Rating system configuration

use crate::error::Result;
use crate::rating::KFactorPolicy;
use crate::types::{Rating, DEFAULT_RATING};
use serde::{Deserialize, Serialize};

/// Parameters of the adaptive ELO calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Rating given to players with no stored state
    pub initial_rating: Rating,
    pub k_factor: KFactorPolicy,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            initial_rating: DEFAULT_RATING,
            k_factor: KFactorPolicy::default(),
        }
    }
}

impl RatingConfig {
    /// Validate configuration parameters.
    ///
    /// Ratings are unbounded, so any initial rating is accepted.
    pub fn validate(&self) -> Result<()> {
        self.k_factor.validate()
    }
}
