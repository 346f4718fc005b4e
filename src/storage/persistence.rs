//! Loading and saving quiz sessions
//!
//! A session is persisted under three keys: the current rating, the answer
//! log and the player statistics. Each key is decoded and validated on its
//! own; a value that fails either step is replaced by its default so that a
//! damaged store never prevents the quiz from starting.

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::engine::QuizSession;
use crate::error::{QuizError, Result};
use crate::storage::kv::KeyValueStore;
use crate::types::{HistoryEntry, PlayerStatistics, Rating, RatingState};

/// Key prefix used by the browser quiz front end
pub const DEFAULT_KEY_PREFIX: &str = "endlessQuiz_";

/// Store keys for one player's state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateKeys {
    pub rating: String,
    pub history: String,
    pub statistics: String,
}

impl StateKeys {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            rating: format!("{}elo", prefix),
            history: format!("{}eloHistory", prefix),
            statistics: format!("{}playerStats", prefix),
        }
    }
}

impl Default for StateKeys {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_KEY_PREFIX)
    }
}

/// Reads and writes [`QuizSession`]s through a key-value store
#[derive(Debug)]
pub struct SessionRepository<S: KeyValueStore> {
    store: S,
    keys: StateKeys,
    initial_rating: Rating,
}

impl<S: KeyValueStore> SessionRepository<S> {
    pub fn new(store: S, keys: StateKeys, initial_rating: Rating) -> Self {
        Self {
            store,
            keys,
            initial_rating,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn keys(&self) -> &StateKeys {
        &self.keys
    }

    /// Load the stored rating, `Ok(None)` when nothing is stored
    pub fn try_load_rating(&self) -> Result<Option<Rating>> {
        self.decode::<Rating>(&self.keys.rating)
    }

    /// Load the stored history, `Ok(None)` when nothing is stored
    pub fn try_load_history(&self) -> Result<Option<Vec<HistoryEntry>>> {
        let Some(history) = self.decode::<Vec<HistoryEntry>>(&self.keys.history)? else {
            return Ok(None);
        };
        validate_history(&history)
            .map_err(|reason| QuizError::corrupt(&self.keys.history, reason))?;
        Ok(Some(history))
    }

    /// Load the stored statistics, `Ok(None)` when nothing is stored
    pub fn try_load_statistics(&self) -> Result<Option<PlayerStatistics>> {
        let Some(statistics) = self.decode::<PlayerStatistics>(&self.keys.statistics)? else {
            return Ok(None);
        };
        statistics
            .validate()
            .map_err(|reason| QuizError::corrupt(&self.keys.statistics, reason))?;
        Ok(Some(statistics))
    }

    /// Load the session, substituting defaults for anything missing or corrupt.
    ///
    /// Statistics that cannot be used are rebuilt from an intact history so
    /// question numbers keep increasing.
    pub fn load(&self) -> QuizSession {
        let history = self
            .try_load_history()
            .unwrap_or_else(|e| self.fallback("history", e))
            .unwrap_or_default();

        let statistics = match self.try_load_statistics() {
            Ok(Some(statistics)) => match statistics_behind_history(&statistics, &history) {
                None => statistics,
                Some(reason) => {
                    warn!("Discarding stored statistics: {}", reason);
                    self.rebuild_statistics(&history)
                }
            },
            Ok(None) if history.is_empty() => PlayerStatistics::new(self.initial_rating),
            Ok(None) => self.rebuild_statistics(&history),
            Err(e) => {
                warn!("Discarding stored statistics: {}", e);
                self.rebuild_statistics(&history)
            }
        };

        let rating = self
            .try_load_rating()
            .unwrap_or_else(|e| self.fallback("rating", e))
            .or_else(|| history.last().map(|entry| entry.rating))
            .unwrap_or(self.initial_rating);

        debug!(
            rating,
            history_len = history.len(),
            total_questions = statistics.total_questions,
            "Loaded quiz session"
        );

        QuizSession {
            state: RatingState::new(rating),
            statistics,
            history,
        }
    }

    /// Persist all three keys
    pub fn save(&self, session: &QuizSession) -> Result<()> {
        let entries = vec![
            (
                self.keys.rating.clone(),
                serde_json::to_string(&session.state.rating)?,
            ),
            (
                self.keys.history.clone(),
                serde_json::to_string(&session.history)?,
            ),
            (
                self.keys.statistics.clone(),
                serde_json::to_string(&session.statistics)?,
            ),
        ];
        self.store.set_many(entries)?;

        debug!(
            rating = session.state.rating,
            history_len = session.history.len(),
            "Saved quiz session"
        );
        Ok(())
    }

    /// Remove all stored state, returning whether anything was removed
    pub fn clear(&self) -> Result<bool> {
        let mut removed = false;
        for key in [&self.keys.rating, &self.keys.history, &self.keys.statistics] {
            removed |= self.store.remove(key)?;
        }
        Ok(removed)
    }

    fn decode<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.get(key)? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| QuizError::corrupt(key, e).into()),
        }
    }

    fn rebuild_statistics(&self, history: &[HistoryEntry]) -> PlayerStatistics {
        info!(
            "Rebuilding player statistics from {} history entries",
            history.len()
        );
        PlayerStatistics::rebuild_from_history(history, self.initial_rating)
    }

    fn fallback<T: Default>(&self, what: &str, error: anyhow::Error) -> T {
        warn!("Discarding stored {}: {}", what, error);
        T::default()
    }
}

/// Statistics must account for every logged answer, otherwise the next
/// question number would repeat one already in the history
fn statistics_behind_history(
    statistics: &PlayerStatistics,
    history: &[HistoryEntry],
) -> Option<String> {
    let last = history.last()?;
    if statistics.total_questions < last.question_number {
        return Some(format!(
            "totalQuestions ({}) is behind question number {}",
            statistics.total_questions, last.question_number
        ));
    }

    let mut logged = std::collections::BTreeMap::<&str, u64>::new();
    for entry in history {
        *logged.entry(entry.category.as_str()).or_default() += 1;
    }
    for (category, count) in logged {
        let recorded = statistics
            .category_performance
            .get(category)
            .map_or(0, |perf| perf.total);
        if recorded < count {
            return Some(format!(
                "category '{}' counts {} answers but the history logs {}",
                category, recorded, count
            ));
        }
    }
    None
}

/// Question numbers must be strictly increasing
fn validate_history(history: &[HistoryEntry]) -> std::result::Result<(), String> {
    for pair in history.windows(2) {
        if pair[1].question_number <= pair[0].question_number {
            return Err(format!(
                "question number {} follows {}",
                pair[1].question_number, pair[0].question_number
            ));
        }
    }
    if let Some(entry) = history.iter().find(|e| !e.item_rating.is_finite()) {
        return Err(format!(
            "question {} has a non-finite rating",
            entry.question_number
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RatingEngine;
    use crate::storage::kv::InMemoryStore;
    use crate::types::AnsweredItem;

    fn repository(store: InMemoryStore) -> SessionRepository<InMemoryStore> {
        SessionRepository::new(store, StateKeys::default(), 800)
    }

    fn item(id: u64, category: &str) -> AnsweredItem {
        AnsweredItem {
            item_id: id,
            text: format!("Question {}", id),
            category: category.to_string(),
            difficulty: 850.0,
            response_time: None,
        }
    }

    fn played_session(answers: u64) -> QuizSession {
        let engine: RatingEngine = RatingEngine::default();
        let mut session = engine.new_session();
        for i in 0..answers {
            engine
                .record_answer(&mut session, &item(i + 1, "Science"), i % 2 == 0)
                .unwrap();
        }
        session
    }

    #[test]
    fn test_state_keys() {
        let keys = StateKeys::default();
        assert_eq!(keys.rating, "endlessQuiz_elo");
        assert_eq!(keys.history, "endlessQuiz_eloHistory");
        assert_eq!(keys.statistics, "endlessQuiz_playerStats");
    }

    #[test]
    fn test_empty_store_defaults() {
        let repo = repository(InMemoryStore::new());
        let session = repo.load();

        assert_eq!(session.rating(), 800);
        assert_eq!(session.streak(), 0);
        assert!(session.history.is_empty());
        assert_eq!(session.statistics, PlayerStatistics::new(800));
    }

    #[test]
    fn test_save_and_load() {
        let repo = repository(InMemoryStore::new());
        let session = played_session(5);

        repo.save(&session).unwrap();
        let loaded = repo.load();

        assert_eq!(loaded.rating(), session.rating());
        assert_eq!(loaded.history, session.history);
        assert_eq!(loaded.statistics, session.statistics);
        // Streak is not persisted
        assert_eq!(loaded.streak(), 0);
    }

    #[test]
    fn test_load_save_without_answers_is_identical() {
        let repo = repository(InMemoryStore::new());
        repo.save(&played_session(4)).unwrap();

        let snapshot = |repo: &SessionRepository<InMemoryStore>| -> Vec<Option<String>> {
            let keys = repo.keys();
            [&keys.rating, &keys.history, &keys.statistics]
                .iter()
                .map(|k| repo.store().get(k).unwrap())
                .collect()
        };

        let before = snapshot(&repo);
        let session = repo.load();
        repo.save(&session).unwrap();
        let after = snapshot(&repo);

        assert_eq!(before, after);
    }

    #[test]
    fn test_corrupt_rating_falls_back() {
        let repo = repository(InMemoryStore::with_values([(
            "endlessQuiz_elo",
            "not a number",
        )]));

        let err = repo.try_load_rating().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<QuizError>(),
            Some(QuizError::CorruptPersistedState { .. })
        ));

        assert_eq!(repo.load().rating(), 800);
    }

    #[test]
    fn test_corrupt_rating_recovered_from_history() {
        let repo = repository(InMemoryStore::new());
        let session = played_session(3);
        repo.save(&session).unwrap();
        repo.store().set("endlessQuiz_elo", "{}".to_string()).unwrap();

        assert_eq!(repo.load().rating(), session.rating());
    }

    #[test]
    fn test_corrupt_statistics_rebuilt_from_history() {
        let repo = repository(InMemoryStore::new());
        let session = played_session(6);
        repo.save(&session).unwrap();
        repo.store()
            .set("endlessQuiz_playerStats", "[1, 2".to_string())
            .unwrap();

        let loaded = repo.load();
        assert_eq!(loaded.statistics.total_questions, 6);
        assert_eq!(loaded.statistics.correct_answers, 3);
        assert_eq!(loaded.statistics.starting_rating, 800);
        assert_eq!(loaded.next_question_number(), 7);
    }

    #[test]
    fn test_inconsistent_statistics_rejected() {
        let repo = repository(InMemoryStore::with_values([(
            "endlessQuiz_playerStats",
            r#"{"totalQuestions": 1, "correctAnswers": 5, "startingELO": 800}"#,
        )]));

        let err = repo.try_load_statistics().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<QuizError>(),
            Some(QuizError::CorruptPersistedState { .. })
        ));
        assert_eq!(repo.load().statistics, PlayerStatistics::new(800));
    }

    #[test]
    fn test_statistics_behind_history_rebuilt() {
        let repo = repository(InMemoryStore::new());
        let session = played_session(3);
        repo.save(&session).unwrap();

        let mut stale = PlayerStatistics::new(800);
        stale.record_answer("Science", true, None, session.history[0].timestamp.date_naive());
        repo.store()
            .set(
                "endlessQuiz_playerStats",
                serde_json::to_string(&stale).unwrap(),
            )
            .unwrap();
        assert!(repo.try_load_statistics().unwrap().is_some());

        let mut loaded = repo.load();
        assert_eq!(loaded.statistics.total_questions, 3);
        assert_eq!(loaded.next_question_number(), 4);

        let engine: RatingEngine = RatingEngine::default();
        let entry = engine
            .record_answer(&mut loaded, &item(4, "Science"), true)
            .unwrap();
        assert_eq!(entry.question_number, 4);
        repo.save(&loaded).unwrap();

        let reloaded = repo.load();
        assert_eq!(reloaded.history.len(), 4);
        assert_eq!(reloaded.statistics.total_questions, 4);
    }

    #[test]
    fn test_statistics_missing_category_counts_rebuilt() {
        let repo = repository(InMemoryStore::new());
        let session = played_session(2);
        repo.save(&session).unwrap();

        let mut moved = session.statistics.clone();
        moved.category_performance.clear();
        moved
            .category_performance
            .insert("History".to_string(), Default::default());
        repo.store()
            .set(
                "endlessQuiz_playerStats",
                serde_json::to_string(&moved).unwrap(),
            )
            .unwrap();

        let loaded = repo.load();
        assert_eq!(loaded.statistics.category_performance["Science"].total, 2);
        assert!(!loaded.statistics.category_performance.contains_key("History"));
    }

    #[test]
    fn test_out_of_order_history_discarded() {
        let repo = repository(InMemoryStore::new());
        let mut session = played_session(2);
        session.history.swap(0, 1);
        repo.save(&session).unwrap();

        assert!(repo.try_load_history().is_err());
        assert!(repo.load().history.is_empty());
    }

    #[test]
    fn test_clear() {
        let repo = repository(InMemoryStore::new());
        repo.save(&played_session(1)).unwrap();

        assert!(repo.clear().unwrap());
        assert!(!repo.clear().unwrap());
        assert!(repo.store().keys().unwrap().is_empty());
    }

    #[test]
    fn test_reads_browser_layout() {
        let repo = repository(InMemoryStore::with_values([
            ("endlessQuiz_elo", "816"),
            (
                "endlessQuiz_eloHistory",
                r#"[{"questionNumber":1,"elo":816,"eloChange":16,"isCorrect":true,
                    "questionRating":800,"questionId":7,"questionText":"Capital of Norway?",
                    "category":"Geography","timestamp":"2025-03-01T12:00:00Z"}]"#,
            ),
            (
                "endlessQuiz_playerStats",
                r#"{"totalQuestions":1,"correctAnswers":1,"averageResponseTime":0,
                    "difficultyPreference":"medium","categoryPerformance":{"Geography":{"total":1,"correct":1}},
                    "sessionCount":1,"lastSessionDate":"2025-03-01","startingELO":800}"#,
            ),
        ]));

        let session = repo.load();
        assert_eq!(session.rating(), 816);
        assert_eq!(session.history[0].item_id, 7);
        assert_eq!(session.statistics.category_performance["Geography"].correct, 1);
        assert_eq!(session.next_question_number(), 2);

        repo.save(&session).unwrap();
        let history = repo.store().get("endlessQuiz_eloHistory").unwrap().unwrap();
        assert!(history.contains(r#""questionRating":800,"#));
    }
}
