//! Tabular and plain-text exports.

use crate::models::{RankedEntry, UnresolvedGroup};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Write a ranked table as CSV with `location,count` columns.
pub fn write_ranked_csv(entries: &[RankedEntry], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    if entries.is_empty() {
        writer.write_record(["location", "count"])?;
    }
    for entry in entries {
        writer.serialize(entry)?;
    }
    writer.flush()?;

    Ok(())
}

/// Write one unresolved gene per line, followed by its accessions.
pub fn write_unresolved(groups: &[UnresolvedGroup], path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    for group in groups {
        writeln!(file, "{}", group)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_ranked_csv() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ranked_all.csv");
        let entries = vec![
            RankedEntry { location: "Membrane".to_string(), count: 2 },
            RankedEntry { location: "Golgi apparatus, cis".to_string(), count: 1 },
        ];

        write_ranked_csv(&entries, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "location,count\nMembrane,2\n\"Golgi apparatus, cis\",1\n"
        );
    }

    #[test]
    fn test_write_empty_ranked_csv_keeps_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ranked_unique.csv");

        write_ranked_csv(&[], &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "location,count\n");
    }

    #[test]
    fn test_write_unresolved() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty_groups.txt");
        let groups = vec![UnresolvedGroup {
            gene: "ORPHAN1".to_string(),
            members: vec!["Q0".to_string()],
        }];

        write_unresolved(&groups, &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "ORPHAN1\tQ0\n");
    }
}
