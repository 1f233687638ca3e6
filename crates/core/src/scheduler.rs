use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::{SliceRandom, index};
use std::cmp::Ordering;

use crate::model::{ProgressKey, Question, QuestionProgress, QuizId, QuizSettings, SessionMode};

/// Days assumed since the last review when it is missing or unreadable.
pub const MISSING_REVIEW_DAYS: i64 = 999;

/// Cap on the correct-count part of the target interval, in days.
pub const MAX_BASE_INTERVAL_DAYS: u32 = 30;

/// Added to the score of a question whose latest attempt was wrong.
pub const RECENT_MISS_BOOST: f64 = 10.0;

/// Score reported for never-attempted questions.
pub const UNSEEN_SCORE: f64 = 999_999.0;

//
// ─── QUEUE ENTRY ───────────────────────────────────────────────────────────────
//

/// A question paired with the quiz it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedQuestion {
    pub quiz_id: QuizId,
    pub question: Question,
}

impl QueuedQuestion {
    #[must_use]
    pub fn new(quiz_id: QuizId, question: Question) -> Self {
        Self { quiz_id, question }
    }

    /// Key under which this question's progress is stored.
    #[must_use]
    pub fn progress_key(&self) -> ProgressKey {
        ProgressKey::new(self.quiz_id.clone(), self.question.id().clone())
    }
}

//
// ─── PRIORITY ──────────────────────────────────────────────────────────────────
//

/// Review urgency of a question. Higher comes first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Priority {
    /// Never attempted; always ahead of every attempted question.
    Unseen,
    /// Days overdue (negative when not yet due), plus any recent-miss boost.
    Scored(f64),
}

impl Priority {
    #[must_use]
    pub fn score(self) -> f64 {
        match self {
            Priority::Unseen => UNSEEN_SCORE,
            Priority::Scored(score) => score,
        }
    }

    /// Descending order: the more urgent priority sorts first.
    fn urgency_cmp(self, other: Self) -> Ordering {
        match (self, other) {
            (Priority::Unseen, Priority::Unseen) => Ordering::Equal,
            (Priority::Unseen, Priority::Scored(_)) => Ordering::Less,
            (Priority::Scored(_), Priority::Unseen) => Ordering::Greater,
            (Priority::Scored(a), Priority::Scored(b)) => b.total_cmp(&a),
        }
    }
}

//
// ─── SCHEDULER ─────────────────────────────────────────────────────────────────
//

/// Picks and orders the questions of a session.
///
/// - `spaced`: every question, most overdue first; unseen questions lead.
/// - `shuffle`: every question once, random order.
/// - `quick`: a random sample of at most `quick_count` questions.
///
/// Randomness comes from the caller so sessions can be replayed from a seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduler {
    quick_count: usize,
}

impl Scheduler {
    #[must_use]
    pub fn new(quick_count: usize) -> Self {
        Self { quick_count }
    }

    #[must_use]
    pub fn from_settings(settings: &QuizSettings) -> Self {
        Self::new(settings.quick_mode_count())
    }

    #[must_use]
    pub fn quick_count(&self) -> usize {
        self.quick_count
    }

    /// Whole days between `last_review` and `now`, rounded down.
    ///
    /// Missing or malformed timestamps count as `MISSING_REVIEW_DAYS`.
    #[must_use]
    pub fn days_since_review(progress: &QuestionProgress, now: DateTime<Utc>) -> i64 {
        let Some(last) = progress.last_review().and_then(|ts| ts.datetime()) else {
            return MISSING_REVIEW_DAYS;
        };

        let elapsed = now - last;
        let days = elapsed.num_days();
        if elapsed < Duration::days(days) {
            days - 1
        } else {
            days
        }
    }

    /// Days a question should rest before its next review.
    ///
    /// Grows with the number of correct answers (capped) and with the
    /// success rate, which scales it by a factor between 1 and 3.
    #[must_use]
    pub fn target_interval(progress: &QuestionProgress) -> f64 {
        let multiplier = 1.0 + 2.0 * progress.success_rate();
        let base = progress
            .correct()
            .saturating_add(1)
            .min(MAX_BASE_INTERVAL_DAYS);
        f64::from(base) * multiplier
    }

    /// Urgency of reviewing a question with the given history at `now`.
    #[must_use]
    pub fn priority(progress: &QuestionProgress, now: DateTime<Utc>) -> Priority {
        if progress.is_new() {
            return Priority::Unseen;
        }

        #[allow(clippy::cast_precision_loss)]
        let days_since = Self::days_since_review(progress, now) as f64;
        let mut score = days_since - Self::target_interval(progress);

        if progress.last_attempt_missed() {
            score += RECENT_MISS_BOOST;
        }

        Priority::Scored(score)
    }

    /// Choose the questions for a session in presentation order.
    ///
    /// `history` is consulted only in spaced mode.
    pub fn select<R, F>(
        &self,
        questions: Vec<QueuedQuestion>,
        mode: SessionMode,
        history: F,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<QueuedQuestion>
    where
        R: Rng + ?Sized,
        F: FnMut(&ProgressKey) -> QuestionProgress,
    {
        match mode {
            SessionMode::Spaced => Self::order_spaced(questions, history, now),
            SessionMode::Shuffle => {
                let mut questions = questions;
                questions.shuffle(rng);
                questions
            }
            SessionMode::Quick => self.sample_quick(questions, rng),
        }
    }

    /// Stable sort by descending priority; equal priorities keep input order.
    pub fn order_spaced<F>(
        questions: Vec<QueuedQuestion>,
        mut history: F,
        now: DateTime<Utc>,
    ) -> Vec<QueuedQuestion>
    where
        F: FnMut(&ProgressKey) -> QuestionProgress,
    {
        let mut scored: Vec<(Priority, QueuedQuestion)> = questions
            .into_iter()
            .map(|queued| {
                let progress = history(&queued.progress_key());
                (Self::priority(&progress, now), queued)
            })
            .collect();

        scored.sort_by(|(a, _), (b, _)| a.urgency_cmp(*b));

        tracing::debug!(
            total = scored.len(),
            unseen = scored
                .iter()
                .filter(|(p, _)| matches!(p, Priority::Unseen))
                .count(),
            "ordered questions by review priority"
        );

        scored.into_iter().map(|(_, queued)| queued).collect()
    }

    fn sample_quick<R>(&self, questions: Vec<QueuedQuestion>, rng: &mut R) -> Vec<QueuedQuestion>
    where
        R: Rng + ?Sized,
    {
        let amount = self.quick_count.min(questions.len());
        let picked = index::sample(rng, questions.len(), amount);

        let mut slots: Vec<Option<QueuedQuestion>> = questions.into_iter().map(Some).collect();
        picked
            .into_iter()
            .filter_map(|idx| slots[idx].take())
            .collect()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(QuizSettings::DEFAULT_QUICK_MODE_COUNT)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionId, StoredTimestamp};
    use crate::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::{HashMap, HashSet};

    fn queued(quiz: &str, id: &str) -> QueuedQuestion {
        QueuedQuestion::new(
            QuizId::new(quiz),
            Question::new(QuestionId::new(id), format!("{id}?"), id),
        )
    }

    fn pool(n: usize) -> Vec<QueuedQuestion> {
        (0..n).map(|i| queued("net/ports.yaml", &format!("q{i}"))).collect()
    }

    fn reviewed(attempts: u32, correct: u32, days_ago: i64) -> QuestionProgress {
        let at = StoredTimestamp::At(fixed_now() - Duration::days(days_ago));
        let last_correct = (correct > 0).then(|| at.clone());
        QuestionProgress::from_persisted(attempts, correct, Some(at), last_correct).unwrap()
    }

    fn ids(questions: &[QueuedQuestion]) -> Vec<&str> {
        questions.iter().map(|q| q.question.id().as_str()).collect()
    }

    #[test]
    fn unseen_questions_have_top_priority() {
        let priority = Scheduler::priority(&QuestionProgress::default(), fixed_now());
        assert_eq!(priority, Priority::Unseen);
        assert_eq!(priority.score(), UNSEEN_SCORE);
    }

    #[test]
    fn priority_follows_interval_formula() {
        // 3 of 4 correct: base 4 days, multiplier 2.5, target 10 days.
        let progress = reviewed(4, 3, 12);
        assert!((Scheduler::target_interval(&progress) - 10.0).abs() < 1e-9);
        assert_eq!(
            Scheduler::priority(&progress, fixed_now()),
            Priority::Scored(2.0)
        );
    }

    #[test]
    fn base_interval_is_capped() {
        let progress = reviewed(50, 50, 0);
        assert!((Scheduler::target_interval(&progress) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn recent_miss_adds_boost() {
        let correct_at = StoredTimestamp::At(fixed_now() - Duration::days(5));
        let missed_at = StoredTimestamp::At(fixed_now() - Duration::days(2));
        let progress =
            QuestionProgress::from_persisted(2, 1, Some(missed_at), Some(correct_at)).unwrap();

        // success 0.5 -> multiplier 2, base 2 -> target 4; 2 - 4 + 10
        assert_eq!(
            Scheduler::priority(&progress, fixed_now()),
            Priority::Scored(8.0)
        );
    }

    #[test]
    fn never_correct_gets_boost() {
        let progress = reviewed(1, 0, 0);
        // target 1, 0 days since, boosted
        assert_eq!(
            Scheduler::priority(&progress, fixed_now()),
            Priority::Scored(9.0)
        );
    }

    #[test]
    fn malformed_review_time_counts_as_very_old() {
        let progress = QuestionProgress::from_persisted(
            1,
            1,
            Some(StoredTimestamp::parse("garbage")),
            Some(StoredTimestamp::At(fixed_now())),
        )
        .unwrap();
        assert_eq!(
            Scheduler::days_since_review(&progress, fixed_now()),
            MISSING_REVIEW_DAYS
        );
        // target = 2 * 3; no boost because the pair cannot be compared
        assert_eq!(
            Scheduler::priority(&progress, fixed_now()),
            Priority::Scored(993.0)
        );
    }

    #[test]
    fn days_since_rounds_down() {
        let at = StoredTimestamp::At(fixed_now() - Duration::hours(47));
        let progress = QuestionProgress::from_persisted(1, 1, Some(at), None).unwrap();
        assert_eq!(Scheduler::days_since_review(&progress, fixed_now()), 1);

        let future = StoredTimestamp::At(fixed_now() + Duration::hours(1));
        let progress = QuestionProgress::from_persisted(1, 1, Some(future), None).unwrap();
        assert_eq!(Scheduler::days_since_review(&progress, fixed_now()), -1);
    }

    #[test]
    fn spaced_puts_unseen_first_in_input_order() {
        let questions = pool(5);
        let mut history = HashMap::new();
        history.insert(questions[0].progress_key(), reviewed(1, 0, 900));
        history.insert(questions[2].progress_key(), reviewed(3, 3, 400));

        let ordered = Scheduler::order_spaced(
            questions,
            |key| history.get(key).cloned().unwrap_or_default(),
            fixed_now(),
        );

        assert_eq!(ids(&ordered), vec!["q1", "q3", "q4", "q0", "q2"]);
    }

    #[test]
    fn spaced_orders_attempted_by_descending_priority() {
        let questions = pool(3);
        let mut history = HashMap::new();
        history.insert(questions[0].progress_key(), reviewed(5, 5, 1));
        history.insert(questions[1].progress_key(), reviewed(2, 2, 30));
        history.insert(questions[2].progress_key(), reviewed(2, 1, 3));

        let ordered = Scheduler::order_spaced(
            questions,
            |key| history.get(key).cloned().unwrap_or_default(),
            fixed_now(),
        );

        assert_eq!(ids(&ordered), vec!["q1", "q2", "q0"]);
    }

    #[test]
    fn spaced_keeps_input_order_for_equal_history() {
        let questions = pool(6);
        let ordered = Scheduler::order_spaced(questions, |_| reviewed(3, 2, 7), fixed_now());
        assert_eq!(ids(&ordered), vec!["q0", "q1", "q2", "q3", "q4", "q5"]);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let scheduler = Scheduler::default();
        let mut rng = StdRng::seed_from_u64(7);
        let input = pool(20);
        let shuffled = scheduler.select(
            input.clone(),
            SessionMode::Shuffle,
            |_| QuestionProgress::default(),
            fixed_now(),
            &mut rng,
        );

        assert_eq!(shuffled.len(), input.len());
        let mut before = ids(&input);
        let mut after = ids(&shuffled);
        before.sort_unstable();
        after.sort_unstable();
        assert_eq!(before, after);
    }

    #[test]
    fn shuffle_is_reproducible_from_seed() {
        let scheduler = Scheduler::default();
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            scheduler.select(
                pool(12),
                SessionMode::Shuffle,
                |_| QuestionProgress::default(),
                fixed_now(),
                &mut rng,
            )
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn quick_is_capped_at_pool_size() {
        let scheduler = Scheduler::new(10);
        let mut rng = StdRng::seed_from_u64(1);
        let picked = scheduler.select(
            pool(5),
            SessionMode::Quick,
            |_| QuestionProgress::default(),
            fixed_now(),
            &mut rng,
        );

        assert_eq!(picked.len(), 5);
        let unique: HashSet<_> = ids(&picked).into_iter().collect();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn quick_samples_without_replacement() {
        let scheduler = Scheduler::new(4);
        let mut rng = StdRng::seed_from_u64(99);
        let picked = scheduler.select(
            pool(30),
            SessionMode::Quick,
            |_| QuestionProgress::default(),
            fixed_now(),
            &mut rng,
        );

        assert_eq!(picked.len(), 4);
        let unique: HashSet<_> = ids(&picked).into_iter().collect();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn empty_pool_selects_nothing() {
        let scheduler = Scheduler::default();
        let mut rng = StdRng::seed_from_u64(3);
        for mode in SessionMode::ALL {
            let picked = scheduler.select(
                Vec::new(),
                mode,
                |_| QuestionProgress::default(),
                fixed_now(),
                &mut rng,
            );
            assert!(picked.is_empty());
        }
    }
}
