//! Common types used throughout the quiz rating engine

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::time::Duration;

/// Integer rating for players and questions
pub type Rating = i64;

/// Identifier of a question within its bank
pub type ItemId = u64;

/// Canonical starting rating for new players
pub const DEFAULT_RATING: Rating = 800;

/// Category label used when an item carries none
pub const DEFAULT_CATEGORY: &str = "General";

/// Difficulty preference recorded for new players
pub const DEFAULT_DIFFICULTY_PREFERENCE: &str = "medium";

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_rating() -> Rating {
    DEFAULT_RATING
}

fn default_difficulty_preference() -> String {
    DEFAULT_DIFFICULTY_PREFERENCE.to_string()
}

/// Write whole numbers as JSON integers (`800`, not `800.0`)
fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Live rating of the player within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingState {
    pub rating: Rating,
    /// Consecutive correct answers
    pub streak: u32,
}

impl RatingState {
    pub fn new(rating: Rating) -> Self {
        Self { rating, streak: 0 }
    }

    /// Apply a computed outcome and advance or break the streak
    pub fn apply(&mut self, outcome: &RatingOutcome, is_correct: bool) {
        self.rating = outcome.new_rating;
        if is_correct {
            self.streak += 1;
        } else {
            self.streak = 0;
        }
    }
}

impl Default for RatingState {
    fn default() -> Self {
        Self::new(DEFAULT_RATING)
    }
}

/// Result of a single rating computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingOutcome {
    pub new_rating: Rating,
    /// Signed change applied to the old rating
    pub delta: Rating,
    /// Probability of a correct answer predicted before answering
    pub expected_score: f64,
    /// K factor selected for this answer
    pub k_factor: f64,
}

/// The subset of a question the rating engine needs to record an answer
#[derive(Debug, Clone, PartialEq)]
pub struct AnsweredItem {
    pub item_id: ItemId,
    pub text: String,
    pub category: String,
    pub difficulty: f64,
    /// How long the player took to answer, when measured
    pub response_time: Option<Duration>,
}

/// Immutable log record of one answered question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// 1-based sequence number
    pub question_number: u64,
    /// Rating after this answer
    #[serde(rename = "elo")]
    pub rating: Rating,
    #[serde(rename = "eloChange")]
    pub delta: Rating,
    pub is_correct: bool,
    #[serde(rename = "questionRating", serialize_with = "serialize_number")]
    pub item_rating: f64,
    #[serde(rename = "questionId")]
    pub item_id: ItemId,
    #[serde(rename = "questionText", default)]
    pub item_text: String,
    #[serde(default = "default_category")]
    pub category: String,
    pub timestamp: DateTime<Utc>,
}

/// Answer counters for one category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPerformance {
    pub total: u64,
    pub correct: u64,
}

impl CategoryPerformance {
    /// Fraction answered correctly, or None before the first answer
    pub fn accuracy(&self) -> Option<f64> {
        (self.total > 0).then(|| self.correct as f64 / self.total as f64)
    }

    fn record(&mut self, is_correct: bool) {
        self.total += 1;
        if is_correct {
            self.correct += 1;
        }
    }
}

/// Longitudinal statistics for one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatistics {
    pub total_questions: u64,
    pub correct_answers: u64,
    /// Running mean response time in milliseconds
    #[serde(default, serialize_with = "serialize_number")]
    pub average_response_time: f64,
    /// Number of answers that contributed to `average_response_time`
    #[serde(default)]
    pub timed_answers: u64,
    #[serde(default = "default_difficulty_preference")]
    pub difficulty_preference: String,
    #[serde(default)]
    pub category_performance: BTreeMap<String, CategoryPerformance>,
    #[serde(default)]
    pub session_count: u64,
    #[serde(default)]
    pub last_session_date: Option<NaiveDate>,
    #[serde(rename = "startingELO", default = "default_rating")]
    pub starting_rating: Rating,
}

impl PlayerStatistics {
    /// Zeroed statistics for a player starting at `starting_rating`
    pub fn new(starting_rating: Rating) -> Self {
        Self {
            total_questions: 0,
            correct_answers: 0,
            average_response_time: 0.0,
            timed_answers: 0,
            difficulty_preference: default_difficulty_preference(),
            category_performance: BTreeMap::new(),
            session_count: 0,
            last_session_date: None,
            starting_rating,
        }
    }

    pub fn incorrect_answers(&self) -> u64 {
        self.total_questions - self.correct_answers
    }

    /// Overall fraction answered correctly, or None before the first answer
    pub fn accuracy(&self) -> Option<f64> {
        (self.total_questions > 0)
            .then(|| self.correct_answers as f64 / self.total_questions as f64)
    }

    /// Count one answered question
    pub fn record_answer(
        &mut self,
        category: &str,
        is_correct: bool,
        response_time: Option<Duration>,
        today: NaiveDate,
    ) {
        self.total_questions += 1;
        if is_correct {
            self.correct_answers += 1;
        }

        self.category_performance
            .entry(category.to_string())
            .or_default()
            .record(is_correct);

        if let Some(elapsed) = response_time {
            self.timed_answers += 1;
            let millis = elapsed.as_secs_f64() * 1000.0;
            self.average_response_time +=
                (millis - self.average_response_time) / self.timed_answers as f64;
        }

        self.touch_session(today);
    }

    /// Start a new session if `today` differs from the last active day.
    ///
    /// Returns true when the session count was incremented.
    pub fn touch_session(&mut self, today: NaiveDate) -> bool {
        if self.last_session_date == Some(today) {
            return false;
        }
        self.session_count += 1;
        self.last_session_date = Some(today);
        true
    }

    /// Check the counters are mutually consistent
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.correct_answers > self.total_questions {
            return Err(format!(
                "correctAnswers ({}) exceeds totalQuestions ({})",
                self.correct_answers, self.total_questions
            ));
        }
        if self.timed_answers > self.total_questions {
            return Err(format!(
                "timedAnswers ({}) exceeds totalQuestions ({})",
                self.timed_answers, self.total_questions
            ));
        }
        if !self.average_response_time.is_finite() || self.average_response_time < 0.0 {
            return Err("averageResponseTime must be a non-negative number".to_string());
        }

        let mut category_total = 0u64;
        for (name, perf) in &self.category_performance {
            if perf.correct > perf.total {
                return Err(format!(
                    "category '{}' has more correct ({}) than total ({}) answers",
                    name, perf.correct, perf.total
                ));
            }
            category_total += perf.total;
        }
        if category_total > self.total_questions {
            return Err(format!(
                "category totals ({}) exceed totalQuestions ({})",
                category_total, self.total_questions
            ));
        }

        Ok(())
    }

    /// Reconstruct counters from an answer log.
    ///
    /// Response times and the difficulty preference are not recorded in the
    /// log and come back as defaults. `total_questions` is at least the last
    /// logged question number so numbering continues after gaps in the log.
    pub fn rebuild_from_history(history: &[HistoryEntry], fallback_starting: Rating) -> Self {
        let starting = history
            .first()
            .map(|first| first.rating - first.delta)
            .unwrap_or(fallback_starting);
        let mut stats = Self::new(starting);

        for entry in history {
            let today = entry.timestamp.with_timezone(&Local).date_naive();
            stats.record_answer(&entry.category, entry.is_correct, None, today);
        }
        if let Some(last) = history.last() {
            stats.total_questions = stats.total_questions.max(last.question_number);
        }

        stats
    }
}

impl Default for PlayerStatistics {
    fn default() -> Self {
        Self::new(DEFAULT_RATING)
    }
}
