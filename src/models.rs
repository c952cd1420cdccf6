//! Data models for the location survey.
//!
//! This module contains the core data structures shared by the
//! aggregation and reporting stages: the per-gene record of locations,
//! frequency tables derived from it, and the run summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A gene and the protein accessions that belong to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneGroup {
    /// Gene name (the grouping key).
    pub gene: String,
    /// Member accessions, in input order, without duplicates.
    pub members: Vec<String>,
}

impl GeneGroup {
    /// Creates a group, dropping repeated accessions but keeping first-seen order.
    pub fn new<I, S>(gene: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut group = Self {
            gene: gene.into(),
            members: Vec::new(),
        };
        group.add_members(members);
        group
    }

    /// Appends accessions not already present.
    pub fn add_members<I, S>(&mut self, members: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for member in members {
            let member = member.into();
            if !self.members.contains(&member) {
                self.members.push(member);
            }
        }
    }
}

/// Persisted mapping from gene to its deduplicated subcellular locations.
///
/// An empty location set means the gene was processed but nothing was
/// found for any of its members. Iteration order is sorted by gene and
/// by location, so serialized snapshots are stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupRecord {
    groups: BTreeMap<String, BTreeSet<String>>,
}

impl GroupRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures the gene has an entry, even if no location is ever added.
    pub fn touch(&mut self, gene: &str) -> &mut BTreeSet<String> {
        self.groups.entry(gene.to_string()).or_default()
    }

    /// Unions `locations` into the gene's set.
    pub fn merge<I, S>(&mut self, gene: &str, locations: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = self.touch(gene);
        set.extend(locations.into_iter().map(Into::into));
    }

    /// Returns the locations recorded for a gene.
    pub fn get(&self, gene: &str) -> Option<&BTreeSet<String>> {
        self.groups.get(gene)
    }

    /// Whether the gene has already been processed.
    pub fn contains(&self, gene: &str) -> bool {
        self.groups.contains_key(gene)
    }

    /// Iterates over `(gene, locations)` in gene order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.groups.iter()
    }

    /// Number of genes in the record.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Genes whose location set is empty.
    pub fn empty_genes(&self) -> Vec<&str> {
        self.groups
            .iter()
            .filter(|(_, locations)| locations.is_empty())
            .map(|(gene, _)| gene.as_str())
            .collect()
    }

    /// Number of distinct locations across all genes.
    pub fn distinct_locations(&self) -> usize {
        self.groups
            .values()
            .flatten()
            .collect::<BTreeSet<_>>()
            .len()
    }
}

impl<G, L> FromIterator<(G, L)> for GroupRecord
where
    G: Into<String>,
    L: IntoIterator,
    L::Item: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (G, L)>>(iter: T) -> Self {
        let mut record = Self::new();
        for (gene, locations) in iter {
            let gene: String = gene.into();
            record.merge(&gene, locations);
        }
        record
    }
}

/// How location frequencies are counted across genes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// Every location of every gene counts once.
    AllOccurrences,
    /// Only genes with exactly one location contribute.
    UniqueOnly,
}

impl fmt::Display for CountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountMode::AllOccurrences => write!(f, "All occurrences"),
            CountMode::UniqueOnly => write!(f, "Single-location genes only"),
        }
    }
}

impl CountMode {
    /// Both modes, in report order.
    pub const ALL: [CountMode; 2] = [CountMode::AllOccurrences, CountMode::UniqueOnly];

    /// Suffix used in artifact file names.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            CountMode::AllOccurrences => "all",
            CountMode::UniqueOnly => "unique",
        }
    }
}

/// A location and how many genes contributed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub location: String,
    pub count: usize,
}

/// Location frequencies derived from a [`GroupRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyTable {
    /// Counting mode used to build the table.
    pub mode: CountMode,
    /// Count per location.
    pub counts: BTreeMap<String, usize>,
}

impl FrequencyTable {
    /// Total of all counts.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    #[allow(dead_code)] // Lookup helper
    pub fn get(&self, location: &str) -> usize {
        self.counts.get(location).copied().unwrap_or(0)
    }
}

/// A gene for which no location was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedGroup {
    pub gene: String,
    pub members: Vec<String>,
}

impl fmt::Display for UnresolvedGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.gene, self.members.join(";"))
    }
}

/// Metadata about a survey run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Input table the genes were read from.
    pub input: String,
    /// Date and time the report was produced.
    pub generated_at: DateTime<Utc>,
    /// URL template used to fetch records.
    pub source: String,
    /// Genes in the final record.
    pub groups_total: usize,
    /// Genes fetched during this run.
    pub groups_fetched: usize,
    /// Genes reused from an earlier snapshot.
    pub groups_resumed: usize,
    /// Genes with no location at all.
    pub groups_unresolved: usize,
    /// Distinct locations across all genes.
    pub distinct_locations: usize,
    /// Wall-clock time spent, in seconds.
    pub duration_seconds: f64,
}

/// Ranked frequencies for one counting mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedTable {
    pub mode: CountMode,
    pub total: usize,
    pub entries: Vec<RankedEntry>,
}

/// The complete survey summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub metadata: RunMetadata,
    pub tables: Vec<RankedTable>,
    pub unresolved: Vec<UnresolvedGroup>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gene_group_dedupes_members() {
        let mut group = GeneGroup::new("TP53", ["P04637", "P04637", "Q53GA5"]);
        assert_eq!(group.members, vec!["P04637", "Q53GA5"]);

        group.add_members(["Q53GA5", "A0A087X1C5"]);
        assert_eq!(group.members, vec!["P04637", "Q53GA5", "A0A087X1C5"]);
    }

    #[test]
    fn test_group_record_merge_is_set_union() {
        let mut record = GroupRecord::new();
        record.merge("GENE1", ["Membrane", "Cytoplasm"]);
        record.merge("GENE1", ["Cytoplasm", "Nucleus"]);

        let locations: Vec<_> = record.get("GENE1").unwrap().iter().cloned().collect();
        assert_eq!(locations, vec!["Cytoplasm", "Membrane", "Nucleus"]);
    }

    #[test]
    fn test_group_record_touch_keeps_empty_gene() {
        let mut record = GroupRecord::new();
        record.touch("ORPHAN");
        record.merge("GENE1", ["Membrane"]);

        assert!(record.contains("ORPHAN"));
        assert_eq!(record.empty_genes(), vec!["ORPHAN"]);
        assert_eq!(record.distinct_locations(), 1);
    }

    #[test]
    fn test_group_record_json_shape() {
        let record: GroupRecord = vec![
            ("GENE2", vec!["Nucleus", "Membrane"]),
            ("GENE1", vec!["Membrane"]),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"GENE1":["Membrane"],"GENE2":["Membrane","Nucleus"]}"#
        );

        let parsed: GroupRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_unresolved_group_display() {
        let group = UnresolvedGroup {
            gene: "ABC1".to_string(),
            members: vec!["P1".to_string(), "P2".to_string()],
        };
        assert_eq!(group.to_string(), "ABC1\tP1;P2");
    }

    #[test]
    fn test_count_mode_suffix() {
        assert_eq!(CountMode::AllOccurrences.file_suffix(), "all");
        assert_eq!(CountMode::UniqueOnly.file_suffix(), "unique");
    }
}
