use quiz_core::QueuedQuestion;
use quiz_core::model::{Quiz, QuizId};
use storage::QuizSource;

/// Questions gathered for a session, with the quizzes they came from.
#[derive(Debug, Clone, Default)]
pub struct SessionPlan {
    pub quizzes: Vec<Quiz>,
    pub skipped: Vec<QuizId>,
}

impl SessionPlan {
    /// Load every quiz in `ids`. Quizzes that fail to load are skipped.
    #[must_use]
    pub fn load(source: &dyn QuizSource, ids: &[QuizId]) -> Self {
        let mut plan = Self::default();
        for id in ids {
            match source.load(id) {
                Ok(quiz) => plan.quizzes.push(quiz),
                Err(e) => {
                    tracing::warn!("skipping {id}: {e}");
                    plan.skipped.push(id.clone());
                }
            }
        }
        plan
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }

    /// Every question of every loaded quiz, quiz by quiz in file order.
    #[must_use]
    pub fn questions(&self) -> Vec<QueuedQuestion> {
        self.quizzes
            .iter()
            .flat_map(|quiz| {
                quiz.questions()
                    .iter()
                    .map(|q| QueuedQuestion::new(quiz.id().clone(), q.clone()))
            })
            .collect()
    }
}
