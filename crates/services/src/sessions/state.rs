use chrono::{DateTime, Utc};
use quiz_core::model::{SessionMode, SessionStats};

use crate::error::SessionError;

/// Lifecycle of a single review session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Running,
    Completed,
    Aborted,
    Failed,
    Finished,
}

impl SessionState {
    fn can_move_to(self, next: SessionState) -> bool {
        use SessionState::{Aborted, Completed, Failed, Finished, NotStarted, Running};
        matches!(
            (self, next),
            (NotStarted, Running | Failed | Finished)
                | (Running, Completed | Aborted)
                | (Completed | Aborted | Failed, Finished)
        )
    }
}

/// A session's state together with its running statistics.
///
/// `Finished` is terminal and stamps the end time exactly once. The state
/// reached before it is kept in `resolution`.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    resolution: Option<SessionState>,
    stats: SessionStats,
}

impl Session {
    #[must_use]
    pub fn new(mode: SessionMode, created_at: DateTime<Utc>) -> Self {
        Self {
            state: SessionState::NotStarted,
            resolution: None,
            stats: SessionStats::new(mode, created_at),
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The state the session was in right before `Finished`.
    #[must_use]
    pub fn resolution(&self) -> Option<SessionState> {
        self.resolution
    }

    #[must_use]
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    #[must_use]
    pub fn into_stats(self) -> SessionStats {
        self.stats
    }

    fn transition(&mut self, next: SessionState) -> Result<(), SessionError> {
        if !self.state.can_move_to(next) {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!(from = ?self.state, to = ?next, "session transition");
        self.state = next;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the session has not started.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.transition(SessionState::Running)
    }

    /// Record one evaluated answer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the session is running.
    pub fn record_answer(&mut self, is_correct: bool) -> Result<(), SessionError> {
        if self.state != SessionState::Running {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                to: SessionState::Running,
            });
        }
        self.stats.record_answer(is_correct);
        Ok(())
    }

    pub fn add_exercise(&mut self, name: impl Into<String>) {
        self.stats.add_exercise(name);
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the session is running.
    pub fn complete(&mut self) -> Result<(), SessionError> {
        self.transition(SessionState::Completed)
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the session is running.
    pub fn abort(&mut self) -> Result<(), SessionError> {
        self.transition(SessionState::Aborted)
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the session has not started.
    pub fn fail(&mut self) -> Result<(), SessionError> {
        self.transition(SessionState::Failed)
    }

    /// Move to `Finished` and set the end time.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` while running or when
    /// already finished.
    pub fn finish(&mut self, at: DateTime<Utc>) -> Result<(), SessionError> {
        let previous = self.state;
        self.transition(SessionState::Finished)?;
        self.resolution = Some(previous);
        self.stats.finish(at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::time::fixed_now;

    #[test]
    fn completed_session_finishes_once() {
        let mut session = Session::new(SessionMode::Spaced, fixed_now());
        session.start().unwrap();
        session.record_answer(true).unwrap();
        session.complete().unwrap();
        session.finish(fixed_now() + Duration::minutes(3)).unwrap();

        assert_eq!(session.state(), SessionState::Finished);
        assert_eq!(session.resolution(), Some(SessionState::Completed));
        assert_eq!(
            session.stats().ended_at(),
            Some(fixed_now() + Duration::minutes(3))
        );

        let err = session.finish(fixed_now() + Duration::hours(1)).unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition { .. }));
        assert_eq!(
            session.stats().ended_at(),
            Some(fixed_now() + Duration::minutes(3))
        );
    }

    #[test]
    fn no_data_goes_straight_to_finished() {
        let mut session = Session::new(SessionMode::Quick, fixed_now());
        session.finish(fixed_now()).unwrap();
        assert_eq!(session.resolution(), Some(SessionState::NotStarted));
        assert_eq!(session.stats().questions_attempted(), 0);
    }

    #[test]
    fn failure_only_before_start() {
        let mut session = Session::new(SessionMode::Spaced, fixed_now());
        session.fail().unwrap();
        session.finish(fixed_now()).unwrap();
        assert_eq!(session.resolution(), Some(SessionState::Failed));

        let mut running = Session::new(SessionMode::Spaced, fixed_now());
        running.start().unwrap();
        assert!(running.fail().is_err());
        assert!(running.finish(fixed_now()).is_err());
    }

    #[test]
    fn answers_require_a_running_session() {
        let mut session = Session::new(SessionMode::Spaced, fixed_now());
        assert!(session.record_answer(true).is_err());
        session.start().unwrap();
        session.record_answer(false).unwrap();
        session.abort().unwrap();
        assert!(session.record_answer(true).is_err());
        assert_eq!(session.stats().questions_attempted(), 1);
    }
}
