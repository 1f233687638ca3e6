use quiz_core::model::{Quiz, QuizError, QuizId};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use crate::repository::{QuizSource, StorageError};

mod loader;
mod resolve;

pub use resolve::{ResolveError, near_misses, resolve_target};

/// Errors raised while loading a single quiz file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("quiz not found: {quiz}")]
    Missing { quiz: QuizId },

    #[error("quiz path escapes the exercises directory: {quiz}")]
    OutsideRoot { quiz: QuizId },

    #[error("quiz file is empty: {quiz}")]
    Empty { quiz: QuizId },

    #[error("quiz file is not a mapping of questions: {quiz}")]
    NotAMapping { quiz: QuizId },

    #[error("invalid YAML in {quiz}: {message}")]
    Yaml { quiz: QuizId, message: String },

    #[error(transparent)]
    Quiz(#[from] QuizError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Name of the folder holding question images; never scanned for quizzes.
pub const IMAGES_DIR_NAME: &str = "images";

/// Quiz files discovered under an exercises directory.
#[derive(Debug, Clone)]
pub struct QuizCatalog {
    root: PathBuf,
    excluded_file: Option<String>,
}

impl QuizCatalog {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            excluded_file: None,
        }
    }

    /// Ignore files with this name (the progress file, when it lives in the tree).
    #[must_use]
    pub fn excluding(mut self, file_name: impl Into<String>) -> Self {
        self.excluded_file = Some(file_name.into());
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_quiz_file(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_file() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        if self.excluded_file.as_deref() == Some(&*name) {
            return false;
        }
        name.ends_with(".yaml") || name.ends_with(".yml")
    }

    /// Every quiz file below the root, sorted by relative path.
    ///
    /// Unreadable directories are skipped with a warning.
    #[must_use]
    pub fn discover(&self) -> Vec<QuizId> {
        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !(entry.file_type().is_dir() && entry.file_name() == IMAGES_DIR_NAME)
            });

        let mut ids: Vec<QuizId> = walker
            .filter_map(|res| match res {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("skipping unreadable catalog entry: {e}");
                    None
                }
            })
            .filter(|entry| self.is_quiz_file(entry))
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(&self.root).ok()?;
                let parts: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                Some(QuizId::new(parts.join("/")))
            })
            .collect();

        ids.sort();
        ids
    }

    /// Absolute path of a quiz, refusing ids that climb out of the root.
    fn quiz_path(&self, id: &QuizId) -> Result<PathBuf, CatalogError> {
        let relative = Path::new(id.as_str());
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes || id.as_str().is_empty() {
            return Err(CatalogError::OutsideRoot { quiz: id.clone() });
        }
        Ok(self.root.join(relative))
    }

    /// Read and parse one quiz file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the file is missing, outside the root, or invalid.
    pub fn load_quiz(&self, id: &QuizId) -> Result<Quiz, CatalogError> {
        let path = self.quiz_path(id)?;
        if !path.is_file() {
            return Err(CatalogError::Missing { quiz: id.clone() });
        }
        let source = std::fs::read_to_string(&path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        loader::parse_quiz(id, &source)
    }
}

impl QuizSource for QuizCatalog {
    fn quiz_ids(&self) -> Vec<QuizId> {
        self.discover()
    }

    fn load(&self, id: &QuizId) -> Result<Quiz, CatalogError> {
        self.load_quiz(id)
    }
}
