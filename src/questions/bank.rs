//! Question bank files
//!
//! Two on-disk formats are accepted. The compact format names its category
//! once and abbreviates question fields:
//!
//! ```json
//! {"version": 2, "category": "Science",
//!  "questions": [{"id": 1, "q": "...", "a": "...", "w": ["..."], "r": 900, "t": []}]}
//! ```
//!
//! The legacy format is a list of complete questions under `questions`.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{QuizError, Result};
use crate::types::{AnsweredItem, ItemId, DEFAULT_CATEGORY};

const DEFAULT_LANGUAGE: &str = "eng";

/// Label of the built-in [`QuestionBank::fallback`] bank
pub const FALLBACK_LABEL: &str = "Built-in";

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// A rated multiple-choice question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: ItemId,
    pub question: String,
    pub answer: String,
    pub wrong_answers: Vec<String>,
    /// Difficulty on the player rating scale
    pub rating: f64,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Question {
    /// Whether `selected` is the correct answer
    pub fn is_correct(&self, selected: &str) -> bool {
        selected == self.answer
    }

    /// The fields the rating engine records for an answer to this question
    pub fn answered_item(&self, response_time: Option<Duration>) -> AnsweredItem {
        AnsweredItem {
            item_id: self.id,
            text: self.question.clone(),
            category: self.category.clone(),
            difficulty: self.rating,
            response_time,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompactQuestion {
    id: ItemId,
    q: String,
    a: String,
    w: Vec<String>,
    r: f64,
    #[serde(default)]
    t: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BankFile {
    Compact {
        #[allow(dead_code)]
        version: serde_json::Value,
        category: String,
        questions: Vec<CompactQuestion>,
    },
    Legacy {
        questions: Vec<Question>,
    },
}

/// A non-empty set of questions under one label
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionBank {
    label: String,
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Create a bank, rejecting empty ones and questions without an answer
    pub fn new(label: impl Into<String>, questions: Vec<Question>) -> Result<Self> {
        let label = label.into();

        if questions.is_empty() {
            return Err(QuizError::QuestionBankError {
                message: format!("Question bank '{}' has no questions", label),
            }
            .into());
        }
        if let Some(q) = questions.iter().find(|q| q.answer.trim().is_empty()) {
            return Err(QuizError::QuestionBankError {
                message: format!("Question {} in '{}' has no answer", q.id, label),
            }
            .into());
        }

        Ok(Self { label, questions })
    }

    /// Parse a bank from either file format
    pub fn from_json(json: &str) -> Result<Self> {
        let file: BankFile =
            serde_json::from_str(json).map_err(|e| QuizError::QuestionBankError {
                message: format!("Unrecognized question bank format: {}", e),
            })?;

        match file {
            BankFile::Compact {
                category,
                questions,
                ..
            } => {
                let questions = questions
                    .into_iter()
                    .map(|q| Question {
                        id: q.id,
                        question: q.q,
                        answer: q.a,
                        wrong_answers: q.w,
                        rating: q.r,
                        category: category.clone(),
                        language: default_language(),
                        tags: q.t,
                    })
                    .collect();
                Self::new(category, questions)
            }
            BankFile::Legacy { questions } => {
                let label = questions
                    .first()
                    .map(|q| q.category.clone())
                    .unwrap_or_else(default_category);
                Self::new(label, questions)
            }
        }
    }

    /// Read and parse a bank file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| QuizError::QuestionBankError {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;

        let bank = Self::from_json(&contents)
            .map_err(|e| e.context(format!("Failed to load {}", path.display())))?;
        debug!(
            "Loaded {} questions for '{}' from {}",
            bank.len(),
            bank.label,
            path.display()
        );
        Ok(bank)
    }

    /// Built-in bank played when no bank file could be loaded
    pub fn fallback() -> Self {
        let question = |id: ItemId,
                        question: &str,
                        answer: &str,
                        wrong: [&str; 3],
                        rating: f64,
                        category: &str| {
            Question {
                id,
                question: question.to_string(),
                answer: answer.to_string(),
                wrong_answers: wrong.iter().map(|w| w.to_string()).collect(),
                rating,
                category: category.to_string(),
                language: default_language(),
                tags: Vec::new(),
            }
        };

        Self {
            label: FALLBACK_LABEL.to_string(),
            questions: vec![
                question(
                    1,
                    "In which plant organelles does photosynthesis take place?",
                    "Chloroplasts",
                    ["Mitochondria", "Vacuoles", "Centrioles"],
                    1000.0,
                    "Biology",
                ),
                question(
                    2,
                    "Which planet is closest to the Sun?",
                    "Mercury",
                    ["Venus", "Mars", "Earth"],
                    700.0,
                    "Science",
                ),
                question(
                    3,
                    "What is the capital of Norway?",
                    "Oslo",
                    ["Bergen", "Trondheim", "Stavanger"],
                    600.0,
                    "Geography",
                ),
            ],
        }
    }

    /// Merge banks into one, renumbering ids 1..N in load order so they
    /// stay unique across the merged set
    pub fn combine(banks: Vec<QuestionBank>, label: impl Into<String>) -> Result<Self> {
        let label = label.into();
        let questions: Vec<Question> = banks
            .into_iter()
            .flat_map(|bank| bank.questions)
            .zip(1..)
            .map(|(question, id)| Question { id, ..question })
            .collect();

        info!("Combined {} questions into '{}'", questions.len(), label);
        Self::new(label, questions)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn into_questions(self) -> Vec<Question> {
        self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false; banks are never empty
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Distinct categories in the bank, sorted
    pub fn categories(&self) -> BTreeSet<&str> {
        self.questions.iter().map(|q| q.category.as_str()).collect()
    }
}
