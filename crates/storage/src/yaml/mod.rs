use quiz_core::model::{GlobalProgress, ProgressKey, QuestionProgress};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::repository::{ProgressStore, StorageError};

mod mapping;

use mapping::{ProgressDocument, meta_from_global, parse_document, record_from_progress};

/// Progress store backed by a single YAML file.
///
/// The whole file is held in memory; `persist` rewrites it atomically via a
/// sibling temporary file.
#[derive(Debug, Clone)]
pub struct YamlProgressStore {
    path: PathBuf,
    records: BTreeMap<ProgressKey, QuestionProgress>,
    global: GlobalProgress,
    writable: bool,
}

impl YamlProgressStore {
    /// An empty store that will write to `path`.
    #[must_use]
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: BTreeMap::new(),
            global: GlobalProgress::default(),
            writable: true,
        }
    }

    /// Read the store at `path`. A missing file yields an empty store.
    ///
    /// Records and meta fields that fail to parse are skipped with a warning;
    /// the rest of the file is kept.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file exists but cannot be read, or
    /// `StorageError::Serialization` if it is not YAML or not shaped like a
    /// progress document.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::empty(path)),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        let parsed = parse_document(&text)?;
        let mut store = Self::empty(path);
        store.global = parsed.global;
        store.records.extend(parsed.records);
        Ok(store)
    }

    /// Like [`load`](Self::load), but never fails.
    ///
    /// A file that is not a progress document is moved to `<name>.corrupt`
    /// and the store starts empty. If the file cannot be read or moved aside,
    /// the store starts empty and refuses to persist, so the file is left as
    /// it is.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::load(&path) {
            Ok(store) => store,
            Err(StorageError::Serialization(reason)) => {
                let backup = sibling_path(&path, ".corrupt");
                match std::fs::rename(&path, &backup) {
                    Ok(()) => {
                        tracing::warn!(
                            "progress file {} is unreadable ({reason}), moved it to {}",
                            path.display(),
                            backup.display()
                        );
                        Self::empty(path)
                    }
                    Err(e) => {
                        tracing::warn!(
                            "progress file {} is unreadable ({reason}) and could not be \
                             moved aside ({e}), progress will not be saved",
                            path.display()
                        );
                        Self::empty(path).read_only()
                    }
                }
            }
            Err(e) => {
                tracing::warn!("{e}, progress will not be saved");
                Self::empty(path).read_only()
            }
        }
    }

    fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of questions with a stored record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn to_document(&self) -> ProgressDocument {
        ProgressDocument {
            meta: meta_from_global(&self.global),
            questions: self
                .records
                .iter()
                .map(|(key, progress)| record_from_progress(key, progress))
                .collect(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        sibling_path(&self.path, ".tmp")
    }
}

/// `path` with `suffix` appended to its file name.
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "progress.yaml".into());
    name.push(suffix);
    path.with_file_name(name)
}

impl ProgressStore for YamlProgressStore {
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
        if !self.writable {
            return Err(StorageError::Protected {
                path: self.path.clone(),
            });
        }

        let text = serde_yaml::to_string(&self.to_document())
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let temp = self.temp_path();
        std::fs::write(&temp, text).map_err(|source| StorageError::Io {
            path: temp.clone(),
            source,
        })?;
        std::fs::rename(&temp, &self.path).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(
            path = %self.path.display(),
            records = self.records.len(),
            "progress persisted"
        );
        Ok(())
    }
}
