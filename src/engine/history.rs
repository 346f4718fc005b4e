//! Read-only projections over the answer log

use crate::types::{HistoryEntry, PlayerStatistics, Rating};
use serde::{Deserialize, Serialize};

/// Aggregate of the ratings recorded in a history log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub highest: Rating,
    pub lowest: Rating,
    /// Mean rating, rounded to the nearest integer
    pub average: Rating,
    pub count: usize,
}

/// Stateless views over a history log and player statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryView;

impl HistoryView {
    /// Summarize the log, or None when nothing has been answered
    pub fn summarize(history: &[HistoryEntry]) -> Option<HistorySummary> {
        let highest = history.iter().map(|e| e.rating).max()?;
        let lowest = history.iter().map(|e| e.rating).min()?;
        let sum: f64 = history.iter().map(|e| e.rating as f64).sum();
        let average = (sum / history.len() as f64).round() as Rating;

        Some(HistorySummary {
            highest,
            lowest,
            average,
            count: history.len(),
        })
    }

    /// Rating gained or lost since the player started
    pub fn net_change(statistics: &PlayerStatistics, current_rating: Rating) -> Rating {
        current_rating - statistics.starting_rating
    }

    /// Entries ordered by question number
    pub fn chronological(history: &[HistoryEntry]) -> Vec<&HistoryEntry> {
        let mut entries: Vec<&HistoryEntry> = history.iter().collect();
        entries.sort_by_key(|e| e.question_number);
        entries
    }

    /// The last `n` entries in log order
    pub fn recent(history: &[HistoryEntry], n: usize) -> &[HistoryEntry] {
        &history[history.len().saturating_sub(n)..]
    }

    /// Per-category accuracy, sorted by category name
    pub fn category_accuracy(statistics: &PlayerStatistics) -> Vec<(&str, f64)> {
        statistics
            .category_performance
            .iter()
            .filter_map(|(name, perf)| perf.accuracy().map(|acc| (name.as_str(), acc)))
            .collect()
    }
}
