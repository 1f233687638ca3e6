use quiz_core::model::{GlobalProgress, ProgressKey, QuestionProgress, Quiz, QuizId};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::{CatalogError, ResolveError, resolve_target};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(String),

    /// The file on disk could not be read or moved aside, so it is never
    /// overwritten.
    #[error("refusing to overwrite unreadable progress file {}", path.display())]
    Protected { path: PathBuf },
}

/// Per-question attempt history plus the global counters.
///
/// Lookups of unknown keys yield a zero record. `persist` flushes everything
/// to durable storage; callers decide whether a failure is fatal.
pub trait ProgressStore {
    fn get(&self, key: &ProgressKey) -> QuestionProgress;

    fn put(&mut self, key: ProgressKey, progress: QuestionProgress);

    fn global(&self) -> &GlobalProgress;

    fn global_mut(&mut self) -> &mut GlobalProgress;

    /// Write the current state to durable storage.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be written.
    fn persist(&mut self) -> Result<(), StorageError>;
}

/// Where quizzes come from.
pub trait QuizSource {
    /// Every known quiz, sorted by path.
    fn quiz_ids(&self) -> Vec<QuizId>;

    /// Map a user-supplied folder or quiz name to quiz ids.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::AmbiguousTarget` when the name matches both a
    /// folder and a quiz file.
    fn resolve(&self, target: &str) -> Result<Vec<QuizId>, ResolveError> {
        resolve_target(&self.quiz_ids(), target)
    }

    /// Load one quiz.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the quiz is missing or cannot be parsed.
    fn load(&self, id: &QuizId) -> Result<Quiz, CatalogError>;
}

/// Simple in-memory progress store for testing and prototyping.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProgressStore {
    records: HashMap<ProgressKey, QuestionProgress>,
    global: GlobalProgress,
    persist_calls: usize,
}

impl InMemoryProgressStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `persist` has been called.
    #[must_use]
    pub fn persist_calls(&self) -> usize {
        self.persist_calls
    }

    /// Whether a record exists for `key` (as opposed to a zero default).
    #[must_use]
    pub fn contains(&self, key: &ProgressKey) -> bool {
        self.records.contains_key(key)
    }
}

impl ProgressStore for InMemoryProgressStore {
    fn get(&self, key: &ProgressKey) -> QuestionProgress {
        self.records.get(key).cloned().unwrap_or_default()
    }

    fn put(&mut self, key: ProgressKey, progress: QuestionProgress) {
        self.records.insert(key, progress);
    }

    fn global(&self) -> &GlobalProgress {
        &self.global
    }

    fn global_mut(&mut self) -> &mut GlobalProgress {
        &mut self.global
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        self.persist_calls += 1;
        Ok(())
    }
}

/// Quizzes held in memory; ids listed as broken fail to load.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuizSource {
    quizzes: Vec<Quiz>,
    broken: HashSet<QuizId>,
}

impl InMemoryQuizSource {
    #[must_use]
    pub fn new(quizzes: Vec<Quiz>) -> Self {
        Self {
            quizzes,
            broken: HashSet::new(),
        }
    }

    /// Register an id that resolves but cannot be loaded.
    #[must_use]
    pub fn with_broken(mut self, id: QuizId) -> Self {
        self.broken.insert(id);
        self
    }
}

impl QuizSource for InMemoryQuizSource {
    fn quiz_ids(&self) -> Vec<QuizId> {
        let mut ids: Vec<QuizId> = self
            .quizzes
            .iter()
            .map(|q| q.id().clone())
            .chain(self.broken.iter().cloned())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    fn load(&self, id: &QuizId) -> Result<Quiz, CatalogError> {
        if self.broken.contains(id) {
            return Err(CatalogError::NotAMapping { quiz: id.clone() });
        }
        self.quizzes
            .iter()
            .find(|q| q.id() == id)
            .cloned()
            .ok_or_else(|| CatalogError::Missing { quiz: id.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Question, QuestionId};
    use quiz_core::time::fixed_now;

    fn quiz(path: &str) -> Quiz {
        Quiz::new(
            QuizId::new(path),
            QuizId::new(path).stem(),
            vec![Question::new(QuestionId::new("q1"), "Q", "A")],
        )
        .unwrap()
    }

    #[test]
    fn unknown_keys_read_as_zero_records() {
        let store = InMemoryProgressStore::new();
        let key = ProgressKey::new(QuizId::new("a.yaml"), QuestionId::new("q1"));
        assert_eq!(store.get(&key), QuestionProgress::default());
        assert!(!store.contains(&key));
    }

    #[test]
    fn put_then_get_round_trips() {
        let mut store = InMemoryProgressStore::new();
        let key = ProgressKey::new(QuizId::new("a.yaml"), QuestionId::new("q1"));
        let mut progress = QuestionProgress::default();
        progress.record_attempt(true, fixed_now());
        store.put(key.clone(), progress.clone());

        assert_eq!(store.get(&key), progress);
        store.persist().unwrap();
        assert_eq!(store.persist_calls(), 1);
    }

    #[test]
    fn in_memory_source_resolves_and_loads() {
        let source = InMemoryQuizSource::new(vec![quiz("net/ports.yaml"), quiz("net/osi.yaml")])
            .with_broken(QuizId::new("net/broken.yaml"));

        let ids = source.resolve("net").unwrap();
        assert_eq!(ids.len(), 3);

        assert!(source.load(&QuizId::new("net/ports.yaml")).is_ok());
        assert!(matches!(
            source.load(&QuizId::new("net/broken.yaml")),
            Err(CatalogError::NotAMapping { .. })
        ));
        assert!(matches!(
            source.load(&QuizId::new("nope.yaml")),
            Err(CatalogError::Missing { .. })
        ));
    }
}
