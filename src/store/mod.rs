//! Snapshot persistence for the per-gene record.
//!
//! The aggregator hands every intermediate [`GroupRecord`] to a
//! [`SnapshotSink`]; the production sink rewrites a JSON file in full.

pub mod snapshot;

pub use snapshot::{load_snapshot, JsonSnapshot};

use crate::models::GroupRecord;
use anyhow::Result;

/// Receives the full record after each gene is processed.
pub trait SnapshotSink {
    fn persist(&mut self, record: &GroupRecord) -> Result<()>;
}

impl<F> SnapshotSink for F
where
    F: FnMut(&GroupRecord) -> Result<()>,
{
    fn persist(&mut self, record: &GroupRecord) -> Result<()> {
        self(record)
    }
}
