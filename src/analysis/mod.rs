//! Analysis modules.
//!
//! Aggregation folds fetched records into the per-gene record; frequency
//! derives the ranked location tables from it.

pub mod aggregator;
pub mod frequency;

pub use aggregator::*;
pub use frequency::*;
