//! Test fixtures shared by the integration tests

use quiz_elo::questions::QuestionBank;
use quiz_elo::types::AnsweredItem;
use std::path::{Path, PathBuf};

pub const SCIENCE_BANK: &str = r#"{
    "version": 2,
    "category": "Science",
    "questions": [
        {"id": 1, "q": "Chemical symbol for gold?", "a": "Au", "w": ["Ag", "Gd", "Go"], "r": 850},
        {"id": 2, "q": "Closest planet to the Sun?", "a": "Mercury", "w": ["Venus", "Mars", "Earth"], "r": 700},
        {"id": 3, "q": "Unit of electrical resistance?", "a": "Ohm", "w": ["Volt", "Ampere", "Watt"], "r": 1100}
    ]
}"#;

pub const HISTORY_BANK: &str = r#"{
    "version": 2,
    "category": "History",
    "questions": [
        {"id": 1, "q": "Year the Berlin Wall fell?", "a": "1989", "w": ["1979", "1991", "1985"], "r": 900},
        {"id": 2, "q": "First emperor of Rome?", "a": "Augustus", "w": ["Nero", "Caesar", "Trajan"], "r": 1200}
    ]
}"#;

/// Write a bank file into `dir` and return its path
pub fn write_bank(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("failed to write bank fixture");
    path
}

pub fn science_bank() -> QuestionBank {
    QuestionBank::from_json(SCIENCE_BANK).expect("science fixture parses")
}

pub fn history_bank() -> QuestionBank {
    QuestionBank::from_json(HISTORY_BANK).expect("history fixture parses")
}

/// An answered item with no measured response time
pub fn item(id: u64, category: &str, difficulty: f64) -> AnsweredItem {
    AnsweredItem {
        item_id: id,
        text: format!("{} question {}", category, id),
        category: category.to_string(),
        difficulty,
        response_time: None,
    }
}
