#![forbid(unsafe_code)]

pub mod error;
pub mod report;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use error::SessionError;
pub use report::{ProgressReport, ReportBuilder};
pub use sessions::{Presenter, Response, SessionOutcome, SessionReport, SessionRunner};
