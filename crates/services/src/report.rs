//! Progress statistics over the catalog.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeSet;

use quiz_core::model::{ProgressKey, QuestionProgress, Quiz, QuizId, StoredTimestamp};
use storage::{ProgressStore, QuizSource, ResolveError};

/// Days of activity shown in the global report.
pub const RECENT_ACTIVITY_DAYS: usize = 7;

/// Counts accumulated over a set of questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub questions: usize,
    pub seen: usize,
    pub attempts: u64,
    pub correct: u64,
}

impl Tally {
    fn add(&mut self, progress: &QuestionProgress) {
        self.questions += 1;
        if !progress.is_new() {
            self.seen += 1;
            self.attempts += u64::from(progress.attempts());
            self.correct += u64::from(progress.correct());
        }
    }

    fn merge(&mut self, other: Tally) {
        self.questions += other.questions;
        self.seen += other.seen;
        self.attempts += other.attempts;
        self.correct += other.correct;
    }

    /// Share of questions attempted at least once, as a percentage.
    #[must_use]
    pub fn seen_percent(&self) -> Option<f64> {
        (self.questions > 0).then(|| self.seen as f64 / self.questions as f64 * 100.0)
    }

    /// Correct answers over all attempts, as a percentage.
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        (self.attempts > 0).then(|| self.correct as f64 / self.attempts as f64 * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizReport {
    pub quiz: QuizId,
    pub name: String,
    pub tally: Tally,
    pub last_review: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FolderReport {
    pub target: String,
    pub tally: Tally,
    pub quizzes: Vec<QuizReport>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalReport {
    pub folders: usize,
    pub quizzes: usize,
    pub tally: Tally,
    pub first_use: Option<NaiveDate>,
    pub last_session: Option<StoredTimestamp>,
    pub recent_activity: Vec<(NaiveDate, u64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressReport {
    Global(GlobalReport),
    Quiz(QuizReport),
    Folder(FolderReport),
    NoMatch { target: String },
}

/// Builds reports from a quiz source and a progress store.
pub struct ReportBuilder<'a> {
    quizzes: &'a dyn QuizSource,
    progress: &'a dyn ProgressStore,
}

impl<'a> ReportBuilder<'a> {
    #[must_use]
    pub fn new(quizzes: &'a dyn QuizSource, progress: &'a dyn ProgressStore) -> Self {
        Self { quizzes, progress }
    }

    /// Report for `target`; `global` or an empty target covers everything.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` when the target is ambiguous.
    pub fn build(&self, target: &str) -> Result<ProgressReport, ResolveError> {
        let target = target.trim();
        if target.is_empty() || target.eq_ignore_ascii_case("global") {
            return Ok(ProgressReport::Global(self.global()));
        }

        let ids = self.quizzes.resolve(target)?;
        let mut reports: Vec<QuizReport> = self
            .load_all(&ids)
            .iter()
            .map(|quiz| self.quiz_report(quiz))
            .collect();

        Ok(match (ids.len(), reports.len()) {
            (_, 0) => ProgressReport::NoMatch {
                target: target.to_owned(),
            },
            (1, _) => ProgressReport::Quiz(reports.remove(0)),
            _ => {
                let mut tally = Tally::default();
                for report in &reports {
                    tally.merge(report.tally);
                }
                ProgressReport::Folder(FolderReport {
                    target: target.to_owned(),
                    tally,
                    quizzes: reports,
                })
            }
        })
    }

    #[must_use]
    pub fn global(&self) -> GlobalReport {
        let ids = self.quizzes.quiz_ids();
        let folders: BTreeSet<&str> = ids.iter().map(QuizId::folder).collect();

        let mut tally = Tally::default();
        for quiz in self.load_all(&ids) {
            tally.merge(self.quiz_report(&quiz).tally);
        }

        let global = self.progress.global();
        GlobalReport {
            folders: folders.len(),
            quizzes: ids.len(),
            tally,
            first_use: global.first_use,
            last_session: global.last_session.clone(),
            recent_activity: global.recent_activity(RECENT_ACTIVITY_DAYS),
        }
    }

    fn load_all(&self, ids: &[QuizId]) -> Vec<Quiz> {
        ids.iter()
            .filter_map(|id| match self.quizzes.load(id) {
                Ok(quiz) => Some(quiz),
                Err(e) => {
                    tracing::warn!("skipping {id}: {e}");
                    None
                }
            })
            .collect()
    }

    fn quiz_report(&self, quiz: &Quiz) -> QuizReport {
        let mut tally = Tally::default();
        let mut last_review = None;
        for question in quiz.questions() {
            let key = ProgressKey::new(quiz.id().clone(), question.id().clone());
            let progress = self.progress.get(&key);
            tally.add(&progress);
            let reviewed = progress.last_review().and_then(StoredTimestamp::datetime);
            last_review = last_review.max(reviewed);
        }
        QuizReport {
            quiz: quiz.id().clone(),
            name: quiz.name().to_owned(),
            tally,
            last_review,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Question, QuestionId};
    use quiz_core::time::fixed_now;
    use storage::{InMemoryProgressStore, InMemoryQuizSource};

    fn quiz(path: &str, questions: &[&str]) -> Quiz {
        let id = QuizId::new(path);
        let name = id.stem().to_owned();
        Quiz::new(
            id,
            name,
            questions
                .iter()
                .map(|q| Question::new(QuestionId::new(*q), "?", "!"))
                .collect(),
        )
        .unwrap()
    }

    fn fixture() -> (InMemoryQuizSource, InMemoryProgressStore) {
        let source = InMemoryQuizSource::new(vec![
            quiz("net/ports.yaml", &["a", "b"]),
            quiz("net/osi.yaml", &["c", "d"]),
            quiz("linux.yaml", &["e"]),
        ]);
        let mut store = InMemoryProgressStore::new();
        let mut progress = QuestionProgress::default();
        progress.record_attempt(true, fixed_now());
        progress.record_attempt(false, fixed_now());
        store.put(
            ProgressKey::new(QuizId::new("net/ports.yaml"), QuestionId::new("a")),
            progress,
        );
        store
            .global_mut()
            .record_session(2, 1, fixed_now().date_naive(), fixed_now());
        (source, store)
    }

    #[test]
    fn global_report_covers_everything() {
        let (source, store) = fixture();
        let built = ReportBuilder::new(&source, &store).build("Global").unwrap();
        let ProgressReport::Global(report) = built else {
            panic!("expected a global report");
        };
        assert_eq!(report.folders, 2);
        assert_eq!(report.quizzes, 3);
        assert_eq!(report.tally.questions, 5);
        assert_eq!(report.tally.seen, 1);
        assert_eq!(report.tally.accuracy(), Some(50.0));
        assert_eq!(report.recent_activity.len(), 1);
    }

    #[test]
    fn single_quiz_and_folder_reports() {
        let (source, store) = fixture();
        let builder = ReportBuilder::new(&source, &store);

        let ProgressReport::Quiz(report) = builder.build("ports").unwrap() else {
            panic!("expected a quiz report");
        };
        assert_eq!(report.tally.seen_percent(), Some(50.0));
        assert_eq!(report.last_review, Some(fixed_now()));

        let ProgressReport::Folder(report) = builder.build("net").unwrap() else {
            panic!("expected a folder report");
        };
        assert_eq!(report.quizzes.len(), 2);
        assert_eq!(report.tally.questions, 4);
        assert_eq!(report.quizzes[0].tally.accuracy(), None);
    }

    #[test]
    fn unknown_target_reports_no_match() {
        let (source, store) = fixture();
        assert_eq!(
            ReportBuilder::new(&source, &store).build("nothing").unwrap(),
            ProgressReport::NoMatch {
                target: "nothing".into()
            }
        );
    }
}
