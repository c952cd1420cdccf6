//! JSON snapshot file.

use crate::models::GroupRecord;
use crate::store::SnapshotSink;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Sink that overwrites a JSON file with the whole record on every call.
///
/// Each write goes to a temporary file in the same directory which then
/// replaces the target, so an interrupted run never leaves a truncated
/// snapshot behind.
#[derive(Debug, Clone)]
pub struct JsonSnapshot {
    path: PathBuf,
    writes: usize,
}

impl JsonSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writes: 0,
        }
    }

    /// Number of snapshots written so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl SnapshotSink for JsonSnapshot {
    fn persist(&mut self, record: &GroupRecord) -> Result<()> {
        write_snapshot(&self.path, record)?;
        self.writes += 1;
        debug!(
            "Snapshot #{} written to {} ({} genes)",
            self.writes,
            self.path.display(),
            record.len()
        );
        Ok(())
    }
}

/// Write the record as pretty JSON, replacing any existing file.
pub fn write_snapshot(path: &Path, record: &GroupRecord) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    serde_json::to_writer_pretty(&mut tmp, record).context("Failed to serialize snapshot")?;
    tmp.write_all(b"\n")?;
    tmp.persist(path)
        .with_context(|| format!("Failed to replace snapshot {}", path.display()))?;

    Ok(())
}

/// Load a snapshot written by an earlier run.
///
/// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
pub fn load_snapshot(path: &Path) -> Result<Option<GroupRecord>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
    let record: GroupRecord = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?;

    Ok(Some(record))
}
