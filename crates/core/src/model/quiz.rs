use thiserror::Error;

use crate::model::ids::{QuestionId, QuizId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("question id `{0}` appears more than once")]
    DuplicateQuestion(QuestionId),
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single prompt/answer pair loaded from a quiz file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    answer: String,
    image: Option<String>,
    strict: bool,
}

impl Question {
    #[must_use]
    pub fn new(id: QuestionId, prompt: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            answer: answer.into(),
            image: None,
            strict: false,
        }
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Disable fuzzy matching for this question.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Opaque image reference, resolved against the images directory by the caller.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// A named set of questions; identified by its file path.
///
/// Questions keep the order in which they appear in the file so that
/// scheduling ties resolve reproducibly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    id: QuizId,
    name: String,
    questions: Vec<Question>,
}

impl Quiz {
    /// Build a quiz, rejecting duplicate question ids.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::DuplicateQuestion` if two questions share an id.
    pub fn new(
        id: QuizId,
        name: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, QuizError> {
        for (idx, question) in questions.iter().enumerate() {
            if questions[..idx].iter().any(|q| q.id == question.id) {
                return Err(QuizError::DuplicateQuestion(question.id.clone()));
            }
        }

        Ok(Self {
            id,
            name: name.into(),
            questions,
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuizId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| &q.id == id)
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
