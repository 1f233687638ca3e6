#![forbid(unsafe_code)]

pub mod catalog;
pub mod repository;
pub mod yaml;

pub use catalog::{CatalogError, QuizCatalog, ResolveError};
pub use repository::{
    InMemoryProgressStore, InMemoryQuizSource, ProgressStore, QuizSource, StorageError,
};
pub use yaml::YamlProgressStore;
