//! Free-text answer checking.

pub mod similarity;

use crate::model::{Question, QuizSettings};

/// How an answer was judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Nothing but whitespace was entered.
    Blank,
    /// Case-insensitive exact match.
    Exact,
    /// Close enough to the expected answer.
    Close { score: u8 },
    /// Wrong; `score` is absent when fuzzy matching was not attempted.
    Incorrect { score: Option<u8> },
}

impl Verdict {
    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, Verdict::Exact | Verdict::Close { .. })
    }
}

/// Decides whether a typed answer matches a question's expected answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerEvaluator {
    fuzzy_threshold: u8,
}

impl AnswerEvaluator {
    /// Thresholds above 100 are clamped to 100.
    #[must_use]
    pub fn new(fuzzy_threshold: u8) -> Self {
        Self {
            fuzzy_threshold: fuzzy_threshold.min(100),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &QuizSettings) -> Self {
        Self::new(settings.fuzzy_threshold())
    }

    #[must_use]
    pub fn fuzzy_threshold(&self) -> u8 {
        self.fuzzy_threshold
    }

    /// Judge `user_answer` against `question`.
    #[must_use]
    pub fn assess(&self, question: &Question, user_answer: &str) -> Verdict {
        let given = user_answer.trim();
        if given.is_empty() {
            return Verdict::Blank;
        }

        let given = given.to_lowercase();
        let expected = question.answer().trim().to_lowercase();
        if given == expected {
            return Verdict::Exact;
        }

        if question.is_strict() {
            return Verdict::Incorrect { score: None };
        }

        let score = similarity::ratio(&given, &expected);
        if score >= self.fuzzy_threshold {
            Verdict::Close { score }
        } else {
            Verdict::Incorrect { score: Some(score) }
        }
    }

    /// True when `user_answer` counts as correct for `question`.
    #[must_use]
    pub fn evaluate(&self, question: &Question, user_answer: &str) -> bool {
        self.assess(question, user_answer).is_correct()
    }
}

impl Default for AnswerEvaluator {
    fn default() -> Self {
        Self::new(QuizSettings::DEFAULT_FUZZY_THRESHOLD)
    }
}
