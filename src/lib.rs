// src/lib.rs

pub mod cache;
pub mod config;
pub mod core;
pub mod error;
pub mod persistence;
pub mod server;
pub mod sync;

pub use crate::core::types::{KnownStatus, Word, WordList};
pub use crate::error::{Error, Result};
pub use crate::sync::{SyncOutcome, SyncService};
