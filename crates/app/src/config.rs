//! `quiz.toml` loading and data-directory layout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use quiz_core::model::QuizSettings;
use serde::Deserialize;

/// Name of the config file looked up in the data directory.
pub const CONFIG_FILE_NAME: &str = "quiz.toml";

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "QUIZ_HOME";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub fuzzy_threshold: u32,
    pub quick_mode_count: usize,
    pub exercises_dir: PathBuf,
    pub images_dir: PathBuf,
    pub progress_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fuzzy_threshold: u32::from(QuizSettings::DEFAULT_FUZZY_THRESHOLD),
            quick_mode_count: QuizSettings::DEFAULT_QUICK_MODE_COUNT,
            exercises_dir: PathBuf::from("Exercises"),
            images_dir: PathBuf::from("images"),
            progress_file: PathBuf::from("progress.yaml"),
        }
    }
}

/// Absolute locations derived from a config and a data directory.
#[derive(Debug, Clone)]
pub struct Paths {
    pub exercises: PathBuf,
    pub images: PathBuf,
    pub progress: PathBuf,
}

impl Config {
    /// Validated quiz settings.
    pub fn settings(&self) -> Result<QuizSettings> {
        QuizSettings::new(self.fuzzy_threshold, self.quick_mode_count)
            .context("invalid quiz settings")
    }

    /// Relative entries are taken relative to `data_dir`.
    #[must_use]
    pub fn paths(&self, data_dir: &Path) -> Paths {
        Paths {
            exercises: data_dir.join(&self.exercises_dir),
            images: data_dir.join(&self.images_dir),
            progress: data_dir.join(&self.progress_file),
        }
    }
}

/// `--data-dir`, then `QUIZ_HOME`, then the current directory.
#[must_use]
pub fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Load `path` when given (it must exist), else `quiz.toml` in `data_dir`
/// if present, else defaults.
pub fn load_config(data_dir: &Path, path: Option<&Path>) -> Result<Config> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => Some(data_dir.join(CONFIG_FILE_NAME)).filter(|p| p.exists()),
    };

    let Some(config_path) = config_path else {
        return Ok(Config::default());
    };

    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("failed to read config: {}", config_path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("failed to parse config: {}", config_path.display()))?;
    tracing::debug!(path = %config_path.display(), "loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path(), None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.settings().unwrap(), QuizSettings::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "fuzzy_threshold = 75\n").unwrap();

        let config = load_config(dir.path(), None).unwrap();
        assert_eq!(config.fuzzy_threshold, 75);
        assert_eq!(config.quick_mode_count, 10);

        let paths = config.paths(dir.path());
        assert_eq!(paths.exercises, dir.path().join("Exercises"));
        assert_eq!(paths.images, dir.path().join("images"));
        assert_eq!(paths.progress, dir.path().join("progress.yaml"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "fuzzy_threshold = 150\n").unwrap();
        let config = load_config(dir.path(), Some(&path)).unwrap();
        assert!(config.settings().is_err());

        std::fs::write(&path, "unknown_key = 1\n").unwrap();
        assert!(load_config(dir.path(), Some(&path)).is_err());

        assert!(load_config(dir.path(), Some(&dir.path().join("absent.toml"))).is_err());
    }
}
