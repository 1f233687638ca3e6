#![forbid(unsafe_code)]

pub mod evaluator;
pub mod model;
pub mod scheduler;
pub mod time;

pub use evaluator::AnswerEvaluator;
pub use scheduler::{Priority, QueuedQuestion, Scheduler};
pub use time::Clock;
