mod global;
mod ids;
mod progress;
mod quiz;
mod session;
mod settings;

pub use ids::{ProgressKey, QuestionId, QuizId};

pub use global::GlobalProgress;
pub use progress::{ProgressError, QuestionProgress, StoredTimestamp};
pub use quiz::{Question, Quiz, QuizError};
pub use session::{ParseModeError, SessionMode, SessionStats, format_duration};
pub use settings::{QuizSettings, SettingsError};
