//! Core domain types for practice history.
//!
//! Holds the phase / retreat / daily-record models, the shared error type,
//! calendar helpers, number formatting, the history configuration document
//! and the command-line settings.

pub mod config;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{PracticeError, Result};
