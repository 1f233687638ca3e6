use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("correct count ({correct}) exceeds attempts ({attempts})")]
    CorrectExceedsAttempts { attempts: u32, correct: u32 },
}

//
// ─── STORED TIMESTAMP ──────────────────────────────────────────────────────────
//

/// A timestamp as read back from the progress store.
///
/// Values that cannot be parsed are kept verbatim so they survive a
/// load/save cycle untouched; scheduling treats them as very old.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredTimestamp {
    At(DateTime<Utc>),
    Malformed(String),
}

impl StoredTimestamp {
    /// Parse an RFC 3339 timestamp, a naive ISO-8601 local timestamp, or a
    /// bare date. Anything else becomes `Malformed`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
            return Self::At(parsed.with_timezone(&Utc));
        }

        let naive = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            });

        match naive.and_then(|n| Local.from_local_datetime(&n).earliest()) {
            Some(local) => Self::At(local.with_timezone(&Utc)),
            None => Self::Malformed(raw.to_owned()),
        }
    }

    #[must_use]
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::At(at) => Some(*at),
            Self::Malformed(_) => None,
        }
    }

    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }

    /// Text form written back to storage.
    #[must_use]
    pub fn to_raw(&self) -> String {
        match self {
            Self::At(at) => at.to_rfc3339_opts(SecondsFormat::Secs, true),
            Self::Malformed(raw) => raw.clone(),
        }
    }
}

impl From<DateTime<Utc>> for StoredTimestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Self::At(at)
    }
}

impl Serialize for StoredTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_raw())
    }
}

impl<'de> Deserialize<'de> for StoredTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

//
// ─── QUESTION PROGRESS ─────────────────────────────────────────────────────────
//

/// Attempt history for one question.
///
/// Invariant: `correct <= attempts`. `last_correct` only moves on a correct
/// attempt and is never newer than `last_review`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionProgress {
    attempts: u32,
    correct: u32,
    last_review: Option<StoredTimestamp>,
    last_correct: Option<StoredTimestamp>,
}

impl QuestionProgress {
    /// Rehydrate progress from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::CorrectExceedsAttempts` if the counts are inconsistent.
    pub fn from_persisted(
        attempts: u32,
        correct: u32,
        last_review: Option<StoredTimestamp>,
        last_correct: Option<StoredTimestamp>,
    ) -> Result<Self, ProgressError> {
        if correct > attempts {
            return Err(ProgressError::CorrectExceedsAttempts { attempts, correct });
        }
        Ok(Self {
            attempts,
            correct,
            last_review,
            last_correct,
        })
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn last_review(&self) -> Option<&StoredTimestamp> {
        self.last_review.as_ref()
    }

    #[must_use]
    pub fn last_correct(&self) -> Option<&StoredTimestamp> {
        self.last_correct.as_ref()
    }

    /// True when the question has never been answered.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.attempts == 0
    }

    /// Fraction of attempts answered correctly, in `[0, 1]`.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        f64::from(self.correct) / f64::from(self.attempts)
    }

    /// Accuracy as a percentage.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        self.success_rate() * 100.0
    }

    /// Whether the most recent attempt was answered incorrectly.
    ///
    /// Malformed timestamps never count as a miss unless `last_correct` is
    /// missing altogether.
    #[must_use]
    pub fn last_attempt_missed(&self) -> bool {
        match (&self.last_review, &self.last_correct) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(review), Some(correct)) => match (review.datetime(), correct.datetime()) {
                (Some(review), Some(correct)) => review > correct,
                _ => false,
            },
        }
    }

    /// Record one answered attempt at `at`.
    pub fn record_attempt(&mut self, is_correct: bool, at: DateTime<Utc>) {
        self.attempts = self.attempts.saturating_add(1);
        self.last_review = Some(StoredTimestamp::At(at));

        if is_correct {
            self.correct = self.correct.saturating_add(1);
            self.last_correct = Some(StoredTimestamp::At(at));
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn correct_attempt_updates_both_timestamps() {
        let mut progress = QuestionProgress::default();
        progress.record_attempt(true, fixed_now());

        assert_eq!(progress.attempts(), 1);
        assert_eq!(progress.correct(), 1);
        assert_eq!(progress.last_review(), Some(&StoredTimestamp::At(fixed_now())));
        assert_eq!(progress.last_correct(), Some(&StoredTimestamp::At(fixed_now())));
        assert!(!progress.last_attempt_missed());
    }

    #[test]
    fn incorrect_attempt_leaves_last_correct_alone() {
        let mut progress = QuestionProgress::default();
        progress.record_attempt(true, fixed_now());
        let later = fixed_now() + Duration::hours(3);
        progress.record_attempt(false, later);

        assert_eq!(progress.attempts(), 2);
        assert_eq!(progress.correct(), 1);
        assert_eq!(progress.last_review(), Some(&StoredTimestamp::At(later)));
        assert_eq!(progress.last_correct(), Some(&StoredTimestamp::At(fixed_now())));
        assert!(progress.last_attempt_missed());
    }

    #[test]
    fn never_correct_counts_as_missed() {
        let mut progress = QuestionProgress::default();
        assert!(!progress.last_attempt_missed());
        progress.record_attempt(false, fixed_now());
        assert!(progress.last_attempt_missed());
        assert_eq!(progress.last_correct(), None);
    }

    #[test]
    fn malformed_pair_is_not_a_miss() {
        let progress = QuestionProgress::from_persisted(
            2,
            1,
            Some(StoredTimestamp::parse("yesterday-ish")),
            Some(StoredTimestamp::At(fixed_now())),
        )
        .unwrap();
        assert!(!progress.last_attempt_missed());
    }

    #[test]
    fn persisted_counts_are_validated() {
        let err = QuestionProgress::from_persisted(1, 2, None, None).unwrap_err();
        assert_eq!(
            err,
            ProgressError::CorrectExceedsAttempts {
                attempts: 1,
                correct: 2
            }
        );
    }

    #[test]
    fn accuracy_handles_zero_attempts() {
        let progress = QuestionProgress::default();
        assert_eq!(progress.accuracy(), 0.0);
        let progress = QuestionProgress::from_persisted(4, 3, None, None).unwrap();
        assert!((progress.accuracy() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn timestamp_parses_rfc3339_and_keeps_malformed_text() {
        let parsed = StoredTimestamp::parse("2023-11-14T22:13:20Z");
        assert_eq!(parsed, StoredTimestamp::At(fixed_now()));
        assert_eq!(parsed.to_raw(), "2023-11-14T22:13:20Z");

        let broken = StoredTimestamp::parse("not a date");
        assert!(broken.is_malformed());
        assert_eq!(broken.datetime(), None);
        assert_eq!(broken.to_raw(), "not a date");
    }

    #[test]
    fn timestamp_accepts_naive_iso_format() {
        let parsed = StoredTimestamp::parse("2024-03-01T09:30:00.123456");
        assert!(parsed.datetime().is_some());
        let parsed = StoredTimestamp::parse("2024-03-01");
        assert!(parsed.datetime().is_some());
    }
}
