//! Release housekeeping
//!
//! Selects old releases by age/count policy and deletes each release together
//! with its tag.

mod cleaner;
mod filter;

pub use cleaner::ReleaseCleaner;
pub use filter::ReleaseFilter;
