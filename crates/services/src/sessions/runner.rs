use rand::SeedableRng;
use rand::rngs::StdRng;
use storage::{ProgressStore, QuizSource, ResolveError};

use quiz_core::evaluator::AnswerEvaluator;
use quiz_core::model::{QuizSettings, SessionMode, SessionStats};
use quiz_core::{Clock, Scheduler};

use super::plan::SessionPlan;
use super::presenter::{Presenter, Response, SessionPosition, is_quit_signal};
use super::state::{Session, SessionState};
use crate::error::SessionError;

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every selected question was answered.
    Completed,
    /// The user quit part-way through.
    Aborted,
    /// The target matched no loadable quiz.
    NoData,
    /// The target could not be resolved; nothing was asked.
    Failed(ResolveError),
}

/// Result of [`SessionRunner::run_session`].
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub stats: SessionStats,
    pub outcome: SessionOutcome,
}

impl SessionReport {
    #[must_use]
    pub fn was_aborted(&self) -> bool {
        self.outcome == SessionOutcome::Aborted
    }
}

/// Drives one session: resolve, schedule, ask, evaluate, record.
pub struct SessionRunner<'a> {
    clock: Clock,
    evaluator: AnswerEvaluator,
    scheduler: Scheduler,
    rng: StdRng,
    quizzes: &'a dyn QuizSource,
    progress: &'a mut dyn ProgressStore,
}

impl<'a> SessionRunner<'a> {
    #[must_use]
    pub fn new(
        settings: &QuizSettings,
        clock: Clock,
        quizzes: &'a dyn QuizSource,
        progress: &'a mut dyn ProgressStore,
    ) -> Self {
        Self {
            clock,
            evaluator: AnswerEvaluator::from_settings(settings),
            scheduler: Scheduler::from_settings(settings),
            rng: StdRng::from_os_rng(),
            quizzes,
            progress,
        }
    }

    /// Use a specific random source for shuffle and quick modes.
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    fn persist_or_warn(&mut self) {
        if let Err(e) = self.progress.persist() {
            tracing::warn!("failed to save progress: {e}");
        }
    }

    /// Run a full session over the quizzes `target` resolves to.
    ///
    /// Progress is written after every answer. Write failures are logged and
    /// the session carries on with its in-memory state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` only if the session state
    /// machine is driven out of order.
    pub fn run_session(
        &mut self,
        target: &str,
        mode: SessionMode,
        presenter: &mut dyn Presenter,
    ) -> Result<SessionReport, SessionError> {
        let mut session = Session::new(mode, self.clock.now());

        let ids = match self.quizzes.resolve(target) {
            Ok(ids) => ids,
            Err(e) => {
                tracing::info!(target_name = target, "session failed: {e}");
                session.fail()?;
                session.finish(self.clock.now())?;
                return Ok(SessionReport {
                    stats: session.into_stats(),
                    outcome: SessionOutcome::Failed(e),
                });
            }
        };

        let plan = SessionPlan::load(self.quizzes, &ids);
        if plan.is_empty() {
            tracing::info!(target_name = target, "no quizzes to review");
            session.finish(self.clock.now())?;
            return Ok(SessionReport {
                stats: session.into_stats(),
                outcome: SessionOutcome::NoData,
            });
        }

        for quiz in &plan.quizzes {
            session.add_exercise(quiz.name());
        }
        session.start()?;

        let store = &*self.progress;
        let queue = self.scheduler.select(
            plan.questions(),
            mode,
            |key| store.get(key),
            self.clock.now(),
            &mut self.rng,
        );
        tracing::info!(
            target_name = target,
            mode = %mode,
            quizzes = plan.quizzes.len(),
            questions = queue.len(),
            "session started"
        );
        presenter.session_started(mode, session.stats().exercises(), queue.len());

        let total = queue.len();
        let mut newly_seen = 0u32;
        let mut aborted = false;
        for (idx, queued) in queue.iter().enumerate() {
            let position = SessionPosition {
                number: idx + 1,
                total,
                quiz: &queued.quiz_id,
            };
            let answer = match presenter.present(&queued.question, &position) {
                Response::Answer(answer) if !is_quit_signal(&answer) => answer,
                _ => {
                    aborted = true;
                    break;
                }
            };

            let verdict = self.evaluator.assess(&queued.question, &answer);
            let is_correct = verdict.is_correct();
            session.record_answer(is_correct)?;

            let key = queued.progress_key();
            let mut progress = self.progress.get(&key);
            if progress.is_new() {
                newly_seen += 1;
            }
            progress.record_attempt(is_correct, self.clock.now());
            tracing::debug!(
                key = %key,
                ?verdict,
                attempts = progress.attempts(),
                "answer recorded"
            );
            self.progress.put(key, progress);
            self.persist_or_warn();

            presenter.feedback(&queued.question, verdict);
        }

        if aborted {
            session.abort()?;
        } else {
            session.complete()?;
        }

        let now = self.clock.now();
        self.progress.global_mut().record_session(
            session.stats().questions_attempted(),
            newly_seen,
            self.clock.today(),
            now,
        );
        self.persist_or_warn();

        let outcome = match session.state() {
            SessionState::Aborted => SessionOutcome::Aborted,
            _ => SessionOutcome::Completed,
        };
        session.finish(now)?;

        let stats = session.into_stats();
        tracing::info!(
            attempted = stats.questions_attempted(),
            correct = stats.questions_correct(),
            ?outcome,
            "session finished"
        );
        Ok(SessionReport { stats, outcome })
    }
}
