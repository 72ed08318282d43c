//! Repository synchronization
//!
//! Converges one local directory to the remote state of one repository.

mod engine;

pub use engine::{RepositorySyncEngine, SyncOutcome, MAX_ATTEMPTS};
