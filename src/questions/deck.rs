//! Shuffled, endlessly cycling question deck

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::questions::bank::{Question, QuestionBank};

/// A question with its answer options in display order
#[derive(Debug, Clone, PartialEq)]
pub struct PresentedQuestion {
    pub question: Question,
    pub options: Vec<String>,
}

impl PresentedQuestion {
    /// Option at a zero-based index
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    /// Whether the option at `index` is the correct answer, None when out of range
    pub fn is_correct(&self, index: usize) -> Option<bool> {
        self.option(index).map(|selected| self.question.is_correct(selected))
    }
}

/// Deals every question once per pass, reshuffling between passes
#[derive(Debug)]
pub struct QuestionDeck {
    label: String,
    questions: Vec<Question>,
    position: usize,
    passes: u64,
    rng: StdRng,
}

impl QuestionDeck {
    pub fn new(bank: QuestionBank) -> Self {
        Self::with_rng(bank, StdRng::from_entropy())
    }

    /// Deterministic deck (for testing)
    pub fn with_seed(bank: QuestionBank, seed: u64) -> Self {
        Self::with_rng(bank, StdRng::seed_from_u64(seed))
    }

    fn with_rng(bank: QuestionBank, mut rng: StdRng) -> Self {
        let label = bank.label().to_string();
        let mut questions = bank.into_questions();
        questions.shuffle(&mut rng);

        Self {
            label,
            questions,
            position: 0,
            passes: 0,
            rng,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false; decks are built from non-empty banks
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Completed passes through the deck
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Deal the next question with its options shuffled
    pub fn deal(&mut self) -> PresentedQuestion {
        if self.position == self.questions.len() {
            self.position = 0;
            self.passes += 1;
            self.questions.shuffle(&mut self.rng);
            debug!("Reshuffled '{}' after pass {}", self.label, self.passes);
        }

        let question = self.questions[self.position].clone();
        self.position += 1;

        let mut options = Vec::with_capacity(question.wrong_answers.len() + 1);
        options.push(question.answer.clone());
        options.extend(question.wrong_answers.iter().cloned());
        options.shuffle(&mut self.rng);

        PresentedQuestion { question, options }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn bank(size: u64) -> QuestionBank {
        let questions = (1..=size)
            .map(|id| Question {
                id,
                question: format!("Question {}", id),
                answer: format!("Right {}", id),
                wrong_answers: vec![
                    format!("Wrong {}a", id),
                    format!("Wrong {}b", id),
                    format!("Wrong {}c", id),
                ],
                rating: 800.0 + id as f64,
                category: "Science".to_string(),
                language: "eng".to_string(),
                tags: Vec::new(),
            })
            .collect();
        QuestionBank::new("Science", questions).unwrap()
    }

    #[test]
    fn test_each_question_once_per_pass() {
        let mut deck = QuestionDeck::with_seed(bank(10), 7);

        let first_pass: HashSet<u64> = (0..10).map(|_| deck.deal().question.id).collect();
        assert_eq!(first_pass.len(), 10);
        assert_eq!(deck.passes(), 0);

        let second_pass: HashSet<u64> = (0..10).map(|_| deck.deal().question.id).collect();
        assert_eq!(second_pass.len(), 10);
        assert_eq!(deck.passes(), 1);
    }

    #[test]
    fn test_presented_options() {
        let mut deck = QuestionDeck::with_seed(bank(3), 1);
        let presented = deck.deal();

        assert_eq!(presented.options.len(), 4);
        let correct: Vec<usize> = (0..4)
            .filter(|&i| presented.is_correct(i) == Some(true))
            .collect();
        assert_eq!(correct.len(), 1);
        assert_eq!(
            presented.option(correct[0]),
            Some(presented.question.answer.as_str())
        );
        assert_eq!(presented.is_correct(4), None);
    }

    #[test]
    fn test_seeded_decks_are_reproducible() {
        let mut a = QuestionDeck::with_seed(bank(8), 42);
        let mut b = QuestionDeck::with_seed(bank(8), 42);
        for _ in 0..20 {
            assert_eq!(a.deal(), b.deal());
        }
    }
}
