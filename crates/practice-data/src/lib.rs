//! Expansion and aggregation engine for practice history.
//!
//! Expands practice phases and retreat events into daily records, merges the
//! two streams, rolls them up into monthly and per-location tables, and reads
//! and writes the CSV tables at the system boundary.

pub mod aggregator;
pub mod analysis;
pub mod expander;
pub mod location;
pub mod merger;
pub mod reader;
pub mod writer;

pub use practice_core as core;
