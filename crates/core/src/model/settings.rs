use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("fuzzy threshold must be between 0 and 100, got {0}")]
    InvalidFuzzyThreshold(u32),

    #[error("quick mode count must be > 0")]
    InvalidQuickModeCount,
}

/// Tunables consumed by answer evaluation and question selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSettings {
    fuzzy_threshold: u8,
    quick_mode_count: usize,
}

impl QuizSettings {
    pub const DEFAULT_FUZZY_THRESHOLD: u8 = 90;
    pub const DEFAULT_QUICK_MODE_COUNT: usize = 10;

    /// Creates validated settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the threshold is above 100 or the quick count is zero.
    pub fn new(fuzzy_threshold: u32, quick_mode_count: usize) -> Result<Self, SettingsError> {
        let fuzzy_threshold = u8::try_from(fuzzy_threshold)
            .ok()
            .filter(|t| *t <= 100)
            .ok_or(SettingsError::InvalidFuzzyThreshold(fuzzy_threshold))?;
        if quick_mode_count == 0 {
            return Err(SettingsError::InvalidQuickModeCount);
        }

        Ok(Self {
            fuzzy_threshold,
            quick_mode_count,
        })
    }

    /// Minimum similarity percentage for a fuzzy match to count as correct.
    #[must_use]
    pub fn fuzzy_threshold(&self) -> u8 {
        self.fuzzy_threshold
    }

    #[must_use]
    pub fn quick_mode_count(&self) -> usize {
        self.quick_mode_count
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            fuzzy_threshold: Self::DEFAULT_FUZZY_THRESHOLD,
            quick_mode_count: Self::DEFAULT_QUICK_MODE_COUNT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = QuizSettings::default();
        assert_eq!(settings.fuzzy_threshold(), 90);
        assert_eq!(settings.quick_mode_count(), 10);
    }

    #[test]
    fn threshold_bounds_are_inclusive() {
        assert!(QuizSettings::new(0, 1).is_ok());
        assert!(QuizSettings::new(100, 1).is_ok());
        assert_eq!(
            QuizSettings::new(101, 1).unwrap_err(),
            SettingsError::InvalidFuzzyThreshold(101)
        );
        assert_eq!(
            QuizSettings::new(1000, 1).unwrap_err(),
            SettingsError::InvalidFuzzyThreshold(1000)
        );
    }

    #[test]
    fn zero_quick_count_is_rejected() {
        assert_eq!(
            QuizSettings::new(90, 0).unwrap_err(),
            SettingsError::InvalidQuickModeCount
        );
    }
}
