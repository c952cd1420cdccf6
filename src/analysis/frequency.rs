//! Location frequency counting and ranking.

use crate::models::{CountMode, FrequencyTable, GroupRecord, RankedEntry, RankedTable};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Count how many genes contribute each location.
///
/// In [`CountMode::AllOccurrences`] every location of every gene counts
/// once. In [`CountMode::UniqueOnly`] only genes with exactly one location
/// contribute.
pub fn count_locations(record: &GroupRecord, mode: CountMode) -> FrequencyTable {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();

    for (_, locations) in record.iter() {
        if mode == CountMode::UniqueOnly && locations.len() != 1 {
            continue;
        }
        for location in locations {
            *counts.entry(location.clone()).or_default() += 1;
        }
    }

    FrequencyTable { mode, counts }
}

/// Rank locations by count, highest first; ties by location name.
pub fn rank(table: &FrequencyTable) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = table
        .counts
        .iter()
        .map(|(location, &count)| RankedEntry {
            location: location.clone(),
            count,
        })
        .collect();

    entries.sort_by(|a, b| {
        Reverse(a.count)
            .cmp(&Reverse(b.count))
            .then_with(|| a.location.cmp(&b.location))
    });
    entries
}

/// Count and rank in one go.
pub fn ranked_table(record: &GroupRecord, mode: CountMode) -> RankedTable {
    let table = count_locations(record, mode);
    RankedTable {
        mode,
        total: table.total(),
        entries: rank(&table),
    }
}

/// The first `n` ranked entries.
pub fn top_n(entries: &[RankedEntry], n: usize) -> &[RankedEntry] {
    &entries[..n.min(entries.len())]
}

/// Share of each entry in the sum of `entries`, as percentages.
pub fn percentages(entries: &[RankedEntry]) -> Vec<f64> {
    let total: usize = entries.iter().map(|e| e.count).sum();
    entries
        .iter()
        .map(|e| {
            if total == 0 {
                0.0
            } else {
                e.count as f64 * 100.0 / total as f64
            }
        })
        .collect()
}
