//! Experience-banded K factor
//!
//! New players move quickly; the K factor shrinks as the number of
//! previously answered questions crosses each band threshold.

use crate::error::{QuizError, Result};
use serde::{Deserialize, Serialize};

/// Multiplier applied to the base K once `min_answers` questions have been answered
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KFactorBand {
    pub min_answers: u64,
    pub multiplier: f64,
}

/// Base K factor plus its experience bands, ordered by threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KFactorPolicy {
    pub base: f64,
    pub bands: Vec<KFactorBand>,
}

impl Default for KFactorPolicy {
    fn default() -> Self {
        Self {
            base: 32.0,
            bands: vec![
                KFactorBand {
                    min_answers: 50,
                    multiplier: 0.8,
                },
                KFactorBand {
                    min_answers: 200,
                    multiplier: 0.6,
                },
                KFactorBand {
                    min_answers: 500,
                    multiplier: 0.4,
                },
            ],
        }
    }
}

impl KFactorPolicy {
    /// Fixed K regardless of experience
    pub fn constant(base: f64) -> Self {
        Self {
            base,
            bands: Vec::new(),
        }
    }

    /// K factor for a player who has answered `answered_so_far` questions
    pub fn k_factor(&self, answered_so_far: u64) -> f64 {
        let multiplier = self
            .bands
            .iter()
            .rev()
            .find(|band| answered_so_far >= band.min_answers)
            .map(|band| band.multiplier)
            .unwrap_or(1.0);

        self.base * multiplier
    }

    /// Validate policy parameters
    pub fn validate(&self) -> Result<()> {
        if !self.base.is_finite() || self.base <= 0.0 {
            return Err(QuizError::ConfigurationError {
                message: "Base K factor must be positive".to_string(),
            }
            .into());
        }

        let mut previous: Option<&KFactorBand> = None;
        for band in &self.bands {
            if !band.multiplier.is_finite() || band.multiplier <= 0.0 || band.multiplier > 1.0 {
                return Err(QuizError::ConfigurationError {
                    message: format!(
                        "K factor multiplier for {} answers must be in (0, 1]",
                        band.min_answers
                    ),
                }
                .into());
            }

            if let Some(prev) = previous {
                if band.min_answers <= prev.min_answers {
                    return Err(QuizError::ConfigurationError {
                        message: "K factor bands must have strictly increasing thresholds"
                            .to_string(),
                    }
                    .into());
                }
                if band.multiplier > prev.multiplier {
                    return Err(QuizError::ConfigurationError {
                        message: "K factor must not grow with experience".to_string(),
                    }
                    .into());
                }
            }
            previous = Some(band);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bands() {
        let policy = KFactorPolicy::default();
        assert_eq!(policy.k_factor(0), 32.0);
        assert_eq!(policy.k_factor(49), 32.0);
        assert!((policy.k_factor(50) - 25.6).abs() < 1e-9);
        assert!((policy.k_factor(199) - 25.6).abs() < 1e-9);
        assert!((policy.k_factor(200) - 19.2).abs() < 1e-9);
        assert!((policy.k_factor(499) - 19.2).abs() < 1e-9);
        assert!((policy.k_factor(500) - 12.8).abs() < 1e-9);
        assert!((policy.k_factor(u64::MAX) - 12.8).abs() < 1e-9);
    }

    #[test]
    fn test_k_never_increases_across_thresholds() {
        let policy = KFactorPolicy::default();
        let samples = [0, 49, 50, 51, 199, 200, 201, 499, 500, 501, 10_000];
        for pair in samples.windows(2) {
            assert!(policy.k_factor(pair[1]) <= policy.k_factor(pair[0]));
        }
    }

    #[test]
    fn test_constant_policy() {
        let policy = KFactorPolicy::constant(24.0);
        assert_eq!(policy.k_factor(0), 24.0);
        assert_eq!(policy.k_factor(1000), 24.0);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(KFactorPolicy::default().validate().is_ok());
        assert!(KFactorPolicy::constant(0.0).validate().is_err());
        assert!(KFactorPolicy::constant(f64::NAN).validate().is_err());

        let unordered = KFactorPolicy {
            base: 32.0,
            bands: vec![
                KFactorBand {
                    min_answers: 200,
                    multiplier: 0.6,
                },
                KFactorBand {
                    min_answers: 50,
                    multiplier: 0.8,
                },
            ],
        };
        assert!(unordered.validate().is_err());

        let growing = KFactorPolicy {
            base: 32.0,
            bands: vec![
                KFactorBand {
                    min_answers: 50,
                    multiplier: 0.5,
                },
                KFactorBand {
                    min_answers: 100,
                    multiplier: 0.9,
                },
            ],
        };
        assert!(growing.validate().is_err());
    }
}
