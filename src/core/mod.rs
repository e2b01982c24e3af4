// src/core/mod.rs

pub mod merge;
pub mod types;

pub use merge::merge;
pub use types::{KnownStatus, StatusSummary, Word, WordKey, WordList};
