mod plan;
mod presenter;
mod runner;
mod state;

pub use crate::error::SessionError;
pub use plan::SessionPlan;
pub use presenter::{
    Presenter, QUIT_SIGNALS, Response, ScriptedPresenter, SessionPosition, is_quit_signal,
};
pub use runner::{SessionOutcome, SessionReport, SessionRunner};
pub use state::{Session, SessionState};
