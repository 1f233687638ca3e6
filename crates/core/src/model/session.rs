use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── SESSION MODE ──────────────────────────────────────────────────────────────
//

/// How questions are picked and ordered for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionMode {
    /// Priority ordering driven by attempt history.
    #[default]
    Spaced,
    /// Every question once, in random order.
    Shuffle,
    /// A small random sample.
    Quick,
}

impl SessionMode {
    pub const ALL: [SessionMode; 3] = [Self::Spaced, Self::Shuffle, Self::Quick];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spaced => "spaced",
            Self::Shuffle => "shuffle",
            Self::Quick => "quick",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid mode `{0}` (expected spaced, shuffle or quick)")]
pub struct ParseModeError(String);

impl FromStr for SessionMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spaced" => Ok(Self::Spaced),
            "shuffle" => Ok(Self::Shuffle),
            "quick" => Ok(Self::Quick),
            other => Err(ParseModeError(other.to_owned())),
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── SESSION STATS ─────────────────────────────────────────────────────────────
//

/// Running tally for one review session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    mode: SessionMode,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    questions_attempted: u32,
    questions_correct: u32,
    exercises: Vec<String>,
}

impl SessionStats {
    #[must_use]
    pub fn new(mode: SessionMode, started_at: DateTime<Utc>) -> Self {
        Self {
            mode,
            started_at,
            ended_at: None,
            questions_attempted: 0,
            questions_correct: 0,
            exercises: Vec::new(),
        }
    }

    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    #[must_use]
    pub fn questions_attempted(&self) -> u32 {
        self.questions_attempted
    }

    #[must_use]
    pub fn questions_correct(&self) -> u32 {
        self.questions_correct
    }

    /// Names of the quizzes included in the session, in load order.
    #[must_use]
    pub fn exercises(&self) -> &[String] {
        &self.exercises
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.ended_at.is_some()
    }

    pub fn add_exercise(&mut self, name: impl Into<String>) {
        self.exercises.push(name.into());
    }

    pub fn record_answer(&mut self, is_correct: bool) {
        self.questions_attempted = self.questions_attempted.saturating_add(1);
        if is_correct {
            self.questions_correct = self.questions_correct.saturating_add(1);
        }
    }

    /// Set the end time. Returns `false` if the session was already finished,
    /// in which case the original end time is kept.
    pub fn finish(&mut self, at: DateTime<Utc>) -> bool {
        if self.ended_at.is_some() {
            return false;
        }
        self.ended_at = Some(at);
        true
    }

    /// Percentage of attempted questions answered correctly.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.questions_attempted == 0 {
            return 0.0;
        }
        f64::from(self.questions_correct) / f64::from(self.questions_attempted) * 100.0
    }

    /// Elapsed time; open sessions are measured up to `now`.
    #[must_use]
    pub fn duration(&self, now: DateTime<Utc>) -> Duration {
        self.ended_at.unwrap_or(now) - self.started_at
    }
}

/// Format a duration as `HH:MM:SS`. Negative durations render as zero.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn mode_parses_known_names_only() {
        for mode in SessionMode::ALL {
            assert_eq!(mode.as_str().parse::<SessionMode>().unwrap(), mode);
        }
        assert!("Spaced".parse::<SessionMode>().is_err());
        assert!("fast".parse::<SessionMode>().is_err());
        assert_eq!(SessionMode::default(), SessionMode::Spaced);
    }

    #[test]
    fn stats_count_answers() {
        let mut stats = SessionStats::new(SessionMode::Quick, fixed_now());
        stats.record_answer(true);
        stats.record_answer(false);
        stats.record_answer(true);
        stats.record_answer(true);

        assert_eq!(stats.questions_attempted(), 4);
        assert_eq!(stats.questions_correct(), 3);
        assert!((stats.accuracy() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn finish_only_sets_end_time_once() {
        let mut stats = SessionStats::new(SessionMode::Spaced, fixed_now());
        let first = fixed_now() + Duration::seconds(90);
        assert!(stats.finish(first));
        assert!(!stats.finish(first + Duration::hours(1)));
        assert_eq!(stats.ended_at(), Some(first));
        assert_eq!(format_duration(stats.duration(fixed_now())), "00:01:30");
    }

    #[test]
    fn duration_formats_hours() {
        assert_eq!(format_duration(Duration::seconds(3 * 3600 + 61)), "03:01:01");
        assert_eq!(format_duration(Duration::seconds(-5)), "00:00:00");
    }
}
