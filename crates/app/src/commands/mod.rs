pub mod list;
pub mod progress;
pub mod start;

use std::path::Path;

use anyhow::Result;
use quiz_core::model::QuizSettings;
use storage::{QuizCatalog, YamlProgressStore};

use crate::config::{Config, Paths};

/// Everything a command needs, built from the resolved config.
pub struct Context {
    pub settings: QuizSettings,
    pub paths: Paths,
    pub catalog: QuizCatalog,
}

impl Context {
    pub fn new(config: &Config, data_dir: &Path) -> Result<Self> {
        let settings = config.settings()?;
        let paths = config.paths(data_dir);
        let mut catalog = QuizCatalog::new(&paths.exercises);
        if let Some(name) = paths.progress.file_name() {
            catalog = catalog.excluding(name.to_string_lossy());
        }
        Ok(Self {
            settings,
            paths,
            catalog,
        })
    }

    pub fn open_progress(&self) -> YamlProgressStore {
        YamlProgressStore::open(&self.paths.progress)
    }
}
