//! Paginated listing aggregation
//!
//! Walks a page-based remote listing with an explicit cursor loop and
//! concatenates every page into one ordered collection.

mod aggregator;

pub use aggregator::{EmptyPolicy, Page, PageAggregator, PageSource, MAX_PAGE_SIZE};
