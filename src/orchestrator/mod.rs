//! Top-level backup and clean runs
//!
//! Wires listing, syncing and release cleanup together and reports progress
//! through a [`Reporter`].

mod report;
mod runner;

pub use report::{ConsoleReporter, ItemEvent, ItemFailure, ItemStatus, Reporter, RunSummary};
pub use runner::{BackupRequest, CleanRequest, Orchestrator, RunSettings};
